use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use promptshelf_core::error::CoreError;
use promptshelf_db::StoreError;
use promptshelf_storage::StorageError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain, store and storage errors and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses of the form `{"error": <message>, "code": <CODE>}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `promptshelf_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A record-store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An object-storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Every generated slug collided with an existing one.
    #[error("Could not generate a unique share slug after {attempts} attempts")]
    SlugGenerationFailed { attempts: u32 },

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => {
                    (StatusCode::FORBIDDEN, "PERMISSION_DENIED", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            AppError::Store(err) => classify_store_error(err),
            AppError::Storage(err) => classify_storage_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::SlugGenerationFailed { attempts } => {
                tracing::error!(attempts, "Share slug generation exhausted");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SLUG_GENERATION_FAILED",
                    self.to_string(),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a record-store error into an HTTP status, error code, and message.
///
/// - Unique constraint violations map to 409.
/// - Foreign key violations mean the referenced row is gone: 404.
/// - Undecodable rows are a validation failure.
/// - Everything else is `OPERATION_FAILED` with a sanitized message.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::UniqueViolation(constraint) => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {constraint}"),
        ),
        StoreError::ForeignKeyViolation(constraint) => {
            tracing::warn!(constraint = %constraint, "Referenced row missing");
            (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Referenced resource not found".to_string(),
            )
        }
        StoreError::Decode(msg) => {
            tracing::error!(error = %msg, "Row failed to decode");
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
        }
        StoreError::Database(db_err) => {
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "OPERATION_FAILED",
                "The operation could not be completed".to_string(),
            )
        }
    }
}

/// Classify a storage error. Backend failures are reported as 502 since the
/// object store is an upstream service.
fn classify_storage_error(err: &StorageError) -> (StatusCode, &'static str, String) {
    match err {
        StorageError::Write { key, message } => {
            tracing::error!(key = %key, error = %message, "Storage write failed");
            (
                StatusCode::BAD_GATEWAY,
                "STORAGE_WRITE_ERROR",
                "Failed to store the uploaded file".to_string(),
            )
        }
        StorageError::Delete { keys, message } => {
            tracing::error!(?keys, error = %message, "Storage delete failed");
            (
                StatusCode::BAD_GATEWAY,
                "STORAGE_DELETE_ERROR",
                "Failed to delete the stored file".to_string(),
            )
        }
        StorageError::NotFound(key) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Object {key} not found"),
        ),
        StorageError::InvalidKey(key) => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Invalid storage key: {key}"),
        ),
        StorageError::Sign { .. } | StorageError::Read { .. } => {
            tracing::error!(error = %err, "Storage error");
            (
                StatusCode::BAD_GATEWAY,
                "STORAGE_ERROR",
                "The storage service is unavailable".to_string(),
            )
        }
    }
}
