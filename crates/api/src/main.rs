use std::net::SocketAddr;
use std::sync::Arc;

use promptshelf_api::config::{ServerConfig, StoreBackend};
use promptshelf_api::router::build_app_router;
use promptshelf_api::state::AppState;
use promptshelf_db::{MemoryStore, PgStore, RecordStore};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        store = ?config.store_backend,
        storage = ?config.storage.backend,
        "Loaded server configuration",
    );

    let state = AppState {
        store: open_store(&config).await,
        storage: promptshelf_storage::connect(&config.storage).await,
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {addr}: {e}"));
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server stopped");
}

/// `RUST_LOG` filtering; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("promptshelf_api=debug,tower_http=debug"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Connect, verify and migrate Postgres, or fall back to the in-memory store.
async fn open_store(config: &ServerConfig) -> Arc<dyn RecordStore> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("In-memory record store: nothing survives a restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL must be set for the postgres store");
            let pool = promptshelf_db::create_pool(url)
                .await
                .expect("Failed to connect to database");
            promptshelf_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            promptshelf_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database ready");
            Arc::new(PgStore::new(pool))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C handler failed");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
