//! Result uploads, deletes, history, signing and export.

mod common;

use std::sync::Arc;

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use common::{
    body_bytes, body_json, build_test_app, build_test_app_with, create_prompt, delete, get,
    post_json, post_multipart, seed_user, FailingRemoveStorage, TestApp, PNG,
};
use promptshelf_core::storage::ResultKind;
use promptshelf_core::types::SortOrder;
use serde_json::json;

async fn upload(app: &TestApp, token: &str, prompt: i64, name: &str) -> serde_json::Value {
    let response = post_multipart(
        app.router(),
        &format!("/api/prompts/{prompt}/results/upload"),
        Some(token),
        &[("file", name, PNG)],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

#[tokio::test]
async fn upload_stores_under_a_prompt_scoped_key() {
    let app = build_test_app();
    let (_, token) = seed_user(&app, "a@example.com").await;
    let prompt = create_prompt(&app, &token, "p").await;

    let result = upload(&app, &token, prompt, "my cat.png").await;
    let key = result["file_path"].as_str().unwrap();
    assert!(key.starts_with(&format!("{prompt}/")), "{key}");
    assert!(key.ends_with("-my_cat.png"), "{key}");
    assert_eq!(result["type"], "image");
    assert_eq!(result["size"], PNG.len());
    assert_eq!(
        result["content"],
        format!("http://localhost:3000/storage/v1/object/public/results/{key}")
    );
    assert_eq!(std::fs::read(app.object_path(key)).unwrap(), PNG);
}

#[tokio::test]
async fn non_image_upload_is_rejected_and_not_stored() {
    let app = build_test_app();
    let (_, token) = seed_user(&app, "a@example.com").await;
    let prompt = create_prompt(&app, &token, "p").await;

    let response = post_multipart(
        app.router(),
        &format!("/api/prompts/{prompt}/results/upload"),
        Some(&token),
        &[("file", "notes.png", &b"definitely text"[..])],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app
        .store()
        .list_results_for_prompt(prompt, SortOrder::Asc)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn upload_without_a_file_is_bad_request() {
    let app = build_test_app();
    let (_, token) = seed_user(&app, "a@example.com").await;
    let prompt = create_prompt(&app, &token, "p").await;

    let response = post_multipart(
        app.router(),
        &format!("/api/prompts/{prompt}/results/upload"),
        Some(&token),
        &[],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_an_image_removes_object_and_row() {
    let app = build_test_app();
    let (_, token) = seed_user(&app, "a@example.com").await;
    let prompt = create_prompt(&app, &token, "p").await;
    let result = upload(&app, &token, prompt, "a.png").await;
    let id = result["id"].as_i64().unwrap();
    let key = result["file_path"].as_str().unwrap();

    let response = delete(app.router(), &format!("/api/results/{id}"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!app.object_path(key).exists());
    assert!(app.store().find_result(id).await.unwrap().is_none());
}

#[tokio::test]
async fn storage_failure_keeps_the_row() {
    let app = build_test_app_with(|inner| Arc::new(FailingRemoveStorage { inner }));
    let (_, token) = seed_user(&app, "a@example.com").await;
    let prompt = create_prompt(&app, &token, "p").await;
    let result = upload(&app, &token, prompt, "a.png").await;
    let id = result["id"].as_i64().unwrap();

    let response = delete(app.router(), &format!("/api/results/{id}"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "STORAGE_DELETE_ERROR");
    assert!(app.store().find_result(id).await.unwrap().is_some());
}

#[tokio::test]
async fn text_results_delete_without_touching_storage() {
    let app = build_test_app_with(|inner| Arc::new(FailingRemoveStorage { inner }));
    let (_, token) = seed_user(&app, "a@example.com").await;
    let prompt = create_prompt(&app, &token, "p").await;
    let created = post_json(
        app.router(),
        &format!("/api/prompts/{prompt}/results"),
        Some(&token),
        json!({"content": "an answer"}),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let id = body_json(created).await["data"]["id"].as_i64().unwrap();

    let response = delete(app.router(), &format!("/api/results/{id}"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn batch_upload_reports_each_file() {
    let app = build_test_app();
    let (_, token) = seed_user(&app, "a@example.com").await;
    let prompt = create_prompt(&app, &token, "p").await;

    let response = post_multipart(
        app.router(),
        &format!("/api/prompts/{prompt}/results/batch"),
        Some(&token),
        &[
            ("files", "one.png", PNG),
            ("files", "bad.txt", &b"nope"[..]),
            ("files", "one.png", PNG),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let outcomes = json["data"].as_array().unwrap();
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0]["result"].is_object());
    assert!(outcomes[1]["error"].is_string());
    assert!(outcomes[2]["result"].is_object());

    // Flat keys, distinct even for the same file name.
    let k0 = outcomes[0]["result"]["file_path"].as_str().unwrap();
    let k2 = outcomes[2]["result"]["file_path"].as_str().unwrap();
    assert!(!k0.contains('/') && k0.ends_with("_one.png"), "{k0}");
    assert_ne!(k0, k2);

    let stored = app
        .store()
        .list_results_for_prompt(prompt, SortOrder::Asc)
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|r| r.kind == ResultKind::Image));
}

#[tokio::test]
async fn batch_delete_validates_ids() {
    let app = build_test_app();
    let (_, token) = seed_user(&app, "a@example.com").await;
    let (_, other) = seed_user(&app, "b@example.com").await;
    let prompt = create_prompt(&app, &token, "p").await;
    let a = upload(&app, &token, prompt, "a.png").await["id"].as_i64().unwrap();

    let empty = post_json(
        app.router(),
        "/api/results/batch-delete",
        Some(&token),
        json!({"ids": []}),
    )
    .await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let foreign = post_json(
        app.router(),
        "/api/results/batch-delete",
        Some(&other),
        json!({"ids": [a]}),
    )
    .await;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
    assert!(app.store().find_result(a).await.unwrap().is_some());
}

#[tokio::test]
async fn batch_delete_removes_everything_named() {
    let app = build_test_app();
    let (_, token) = seed_user(&app, "a@example.com").await;
    let prompt = create_prompt(&app, &token, "p").await;
    let a = upload(&app, &token, prompt, "a.png").await;
    let b = upload(&app, &token, prompt, "b.png").await;

    let response = post_json(
        app.router(),
        "/api/results/batch-delete",
        Some(&token),
        json!({"ids": [a["id"], b["id"], a["id"]]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["deleted"], 2);

    for r in [&a, &b] {
        assert!(!app.object_path(r["file_path"].as_str().unwrap()).exists());
    }
}

#[tokio::test]
async fn history_filters_by_file_name_and_date() {
    let app = build_test_app();
    let (_, token) = seed_user(&app, "a@example.com").await;
    let prompt = create_prompt(&app, &token, "p").await;
    upload(&app, &token, prompt, "sunset.png").await;
    upload(&app, &token, prompt, "forest.png").await;

    let all = body_json(get(app.router(), "/api/results", Some(&token)).await).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 2);
    assert!(all["data"][0]["file_path"]
        .as_str()
        .unwrap()
        .ends_with("forest.png"));

    let search = body_json(get(app.router(), "/api/results?q=SUNSET", Some(&token)).await).await;
    assert_eq!(search["data"].as_array().unwrap().len(), 1);

    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let in_range = body_json(
        get(
            app.router(),
            &format!("/api/results?from={today}&to={today}"),
            Some(&token),
        )
        .await,
    )
    .await;
    assert_eq!(in_range["data"].as_array().unwrap().len(), 2);

    let before = body_json(
        get(app.router(), "/api/results?to=2000-01-01", Some(&token)).await,
    )
    .await;
    assert!(before["data"].as_array().unwrap().is_empty());

    let inverted = get(
        app.router(),
        "/api/results?from=2024-02-02&to=2024-02-01",
        Some(&token),
    )
    .await;
    assert_eq!(inverted.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signed_history_signs_every_image() {
    let app = build_test_app();
    let (_, token) = seed_user(&app, "a@example.com").await;
    let prompt = create_prompt(&app, &token, "p").await;
    let gone = upload(&app, &token, prompt, "gone.png").await;
    upload(&app, &token, prompt, "here.png").await;
    std::fs::remove_file(app.object_path(gone["file_path"].as_str().unwrap())).unwrap();

    let json = body_json(
        get(
            app.router(),
            "/api/results/signed?expiry_minutes=5&order=asc",
            Some(&token),
        )
        .await,
    )
    .await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[0]["signed_url"].is_null());
    assert!(rows[1]["signed_url"]
        .as_str()
        .unwrap()
        .contains("/storage/v1/object/sign/results/"));

    let too_long = get(
        app.router(),
        "/api/results/signed?expiry_minutes=20000",
        Some(&token),
    )
    .await;
    assert_eq!(too_long.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn csv_export_lists_images() {
    let app = build_test_app();
    let (_, token) = seed_user(&app, "a@example.com").await;
    let prompt = create_prompt(&app, &token, "p").await;

    let empty = get(app.router(), "/api/results/export.csv", Some(&token)).await;
    assert_eq!(empty.status(), StatusCode::NOT_FOUND);

    let result = upload(&app, &token, prompt, "pic.png").await;
    let response = get(app.router(), "/api/results/export.csv", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let disposition = response.headers()[CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"upload_history_"));

    let csv = String::from_utf8(body_bytes(response).await).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("\"ID\",\"File path\",\"URL\",\"Size\",\"Created at\"")
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with(&format!("\"{}\",", result["id"])));
    assert!(row.contains(&format!("\"{} B\"", PNG.len())));
    assert_eq!(lines.next(), None);
}
