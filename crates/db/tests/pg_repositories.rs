//! Repository tests against a real Postgres database.
//!
//! Run with `DATABASE_URL` pointing at a scratch server and
//! `cargo test -p promptshelf-db -- --ignored`.

use assert_matches::assert_matches;
use promptshelf_core::storage::ResultKind;
use promptshelf_core::types::SortOrder;
use promptshelf_db::models::prompt::{CreatePrompt, PromptQuery};
use promptshelf_db::models::result::{CreateResult, ResultQuery};
use promptshelf_db::models::user::NewUser;
use promptshelf_db::repositories::{PromptRepo, ResultRepo, SharedLinkRepo, TagRepo, UserRepo};
use promptshelf_db::{PgStore, RecordStore, StoreError};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, email: &str) -> i64 {
    UserRepo::create(
        pool,
        &NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_prompt(pool: &PgPool, user_id: i64, content: &str) -> i64 {
    PromptRepo::create(
        pool,
        &CreatePrompt {
            user_id,
            title: None,
            content: content.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_tag_name_per_owner(pool: PgPool) {
    let owner = seed_user(&pool, "o@example.com").await;
    let other = seed_user(&pool, "p@example.com").await;
    let store = PgStore::new(pool.clone());

    store.insert_tag(owner, "demo").await.unwrap();
    let err = store.insert_tag(owner, "demo").await.unwrap_err();
    assert_matches!(err, StoreError::UniqueViolation(c) if c == "uq_tags_user_name");

    store.insert_tag(other, "demo").await.unwrap();
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_link_is_idempotent_and_counted(pool: PgPool) {
    let owner = seed_user(&pool, "o@example.com").await;
    let prompt = seed_prompt(&pool, owner, "hello").await;
    let tag = TagRepo::create(&pool, owner, "demo").await.unwrap();

    assert!(TagRepo::link(&pool, prompt, tag.id).await.unwrap());
    assert!(!TagRepo::link(&pool, prompt, tag.id).await.unwrap());

    let counts = TagRepo::counts_for_owner(&pool, owner).await.unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].count, 1);

    assert!(TagRepo::unlink(&pool, prompt, tag.id).await.unwrap());
    assert!(TagRepo::counts_for_owner(&pool, owner).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_link_to_missing_tag_is_fk_violation(pool: PgPool) {
    let owner = seed_user(&pool, "o@example.com").await;
    let prompt = seed_prompt(&pool, owner, "hello").await;
    let store = PgStore::new(pool);

    let err = store.insert_prompt_tag(prompt, 999_999).await.unwrap_err();
    assert_matches!(err, StoreError::ForeignKeyViolation(_));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_blank_content_rejected_by_check(pool: PgPool) {
    let owner = seed_user(&pool, "o@example.com").await;
    let result = PromptRepo::create(
        &pool,
        &CreatePrompt {
            user_id: owner,
            title: None,
            content: "   ".to_string(),
        },
    )
    .await;
    assert!(result.is_err());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_prompt_delete_cascades(pool: PgPool) {
    let owner = seed_user(&pool, "o@example.com").await;
    let prompt = seed_prompt(&pool, owner, "hello").await;
    let tag = TagRepo::create(&pool, owner, "demo").await.unwrap();
    TagRepo::link(&pool, prompt, tag.id).await.unwrap();
    SharedLinkRepo::create(&pool, "abcdefghij", prompt).await.unwrap();
    let result = ResultRepo::create(
        &pool,
        &CreateResult {
            prompt_id: prompt,
            kind: ResultKind::Text,
            content: "out".to_string(),
            file_path: None,
            size: None,
        },
    )
    .await
    .unwrap();

    assert!(PromptRepo::delete(&pool, prompt).await.unwrap());

    assert!(ResultRepo::find_by_id(&pool, result.id).await.unwrap().is_none());
    assert!(SharedLinkRepo::find_by_slug(&pool, "abcdefghij").await.unwrap().is_none());
    assert!(TagRepo::list_for_prompt(&pool, prompt).await.unwrap().is_empty());
    assert!(TagRepo::find_by_id(&pool, tag.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_search_escapes_wildcards(pool: PgPool) {
    let owner = seed_user(&pool, "o@example.com").await;
    seed_prompt(&pool, owner, "100% cotton").await;
    seed_prompt(&pool, owner, "1000 threads").await;

    let query = PromptQuery {
        search: Some("100%".to_string()),
        order: SortOrder::Desc,
        tag_id: None,
    };
    let found = PromptRepo::list_for_owner(&pool, owner, &query).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].content, "100% cotton");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_history_is_scoped_to_owner(pool: PgPool) {
    let owner = seed_user(&pool, "o@example.com").await;
    let other = seed_user(&pool, "p@example.com").await;
    let mine = seed_prompt(&pool, owner, "mine").await;
    let theirs = seed_prompt(&pool, other, "theirs").await;
    let store = PgStore::new(pool);

    for (prompt_id, key) in [(mine, "1_a.png"), (theirs, "2_b.png")] {
        store
            .create_result(&CreateResult {
                prompt_id,
                kind: ResultKind::Image,
                content: format!("http://x/storage/v1/object/public/results/{key}"),
                file_path: Some(key.to_string()),
                size: Some(1),
            })
            .await
            .unwrap();
    }

    let history = store
        .list_results_for_owner(owner, &ResultQuery::default())
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].file_path.as_deref(), Some("1_a.png"));
    assert_eq!(history[0].kind, ResultKind::Image);
}
