//! Tag find-or-create, linking and usage counts.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, create_prompt, delete, get, post_json, seed_user};
use promptshelf_api::services::tag_linking;
use serde_json::json;

#[tokio::test]
async fn concurrent_ensure_tag_yields_one_row() {
    let app = build_test_app();
    let (user_id, _) = seed_user(&app, "a@example.com").await;
    let store = app.store();

    let (a, b) = tokio::join!(
        tag_linking::ensure_tag(store, user_id, "foo"),
        tag_linking::ensure_tag(store, user_id, " foo "),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.id, b.id);

    let tags = store.list_tags(user_id).await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, "foo");
}

#[tokio::test]
async fn tag_names_are_scoped_per_owner() {
    let app = build_test_app();
    let (alice, _) = seed_user(&app, "alice@example.com").await;
    let (bob, _) = seed_user(&app, "bob@example.com").await;

    let a = tag_linking::ensure_tag(app.store(), alice, "shared").await.unwrap();
    let b = tag_linking::ensure_tag(app.store(), bob, "shared").await.unwrap();
    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn empty_tag_name_is_rejected() {
    let app = build_test_app();
    let (_, token) = seed_user(&app, "a@example.com").await;
    let response = post_json(app.router(), "/api/tags", Some(&token), json!({"name": "   "})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn linking_twice_leaves_one_link() {
    let app = build_test_app();
    let (_, token) = seed_user(&app, "a@example.com").await;
    let prompt = create_prompt(&app, &token, "hello").await;
    let tag = body_json(
        post_json(app.router(), "/api/tags", Some(&token), json!({"name": "demo"})).await,
    )
    .await["data"]["id"]
        .as_i64()
        .unwrap();

    let uri = format!("/api/prompts/{prompt}/tags/{tag}");
    let first = body_json(common::put_json(app.router(), &uri, Some(&token), json!({})).await).await;
    let second = body_json(common::put_json(app.router(), &uri, Some(&token), json!({})).await).await;
    assert_eq!(first["data"]["changed"], true);
    assert_eq!(second["data"]["changed"], false);

    let tags = app.store().list_tags_for_prompt(prompt).await.unwrap();
    assert_eq!(tags.len(), 1);
}

#[tokio::test]
async fn link_then_unlink_updates_counts() {
    let app = build_test_app();
    let (_, token) = seed_user(&app, "a@example.com").await;
    let prompt = create_prompt(&app, &token, "hello").await;

    let tag = body_json(
        post_json(app.router(), "/api/tags", Some(&token), json!({"name": "demo"})).await,
    )
    .await["data"]["id"]
        .as_i64()
        .unwrap();
    let link_uri = format!("/api/prompts/{prompt}/tags/{tag}");
    let linked = common::put_json(app.router(), &link_uri, Some(&token), json!({})).await;
    assert_eq!(linked.status(), StatusCode::OK);

    let counts = body_json(get(app.router(), "/api/tags/counts", Some(&token)).await).await;
    assert_eq!(counts["data"].as_array().unwrap().len(), 1);
    assert_eq!(counts["data"][0]["name"], "demo");
    assert_eq!(counts["data"][0]["count"], 1);
    assert_eq!(counts["data"][0]["font_size"], 32);

    let unlinked = delete(app.router(), &link_uri, Some(&token)).await;
    assert_eq!(unlinked.status(), StatusCode::OK);
    assert_eq!(body_json(unlinked).await["data"]["changed"], true);

    let counts = body_json(get(app.router(), "/api/tags/counts", Some(&token)).await).await;
    assert!(counts["data"].as_array().unwrap().is_empty());

    // Unlinking again is a no-op.
    let again = delete(app.router(), &link_uri, Some(&token)).await;
    assert_eq!(again.status(), StatusCode::OK);
    assert_eq!(body_json(again).await["data"]["changed"], false);
}

#[tokio::test]
async fn cannot_link_another_users_tag() {
    let app = build_test_app();
    let (_, alice) = seed_user(&app, "alice@example.com").await;
    let (bob_id, _) = seed_user(&app, "bob@example.com").await;
    let prompt = create_prompt(&app, &alice, "alice's").await;
    let bobs_tag = tag_linking::ensure_tag(app.store(), bob_id, "bob-only")
        .await
        .unwrap();

    let response = common::put_json(
        app.router(),
        &format!("/api/prompts/{prompt}/tags/{}", bobs_tag.id),
        Some(&alice),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deleting_a_tag_drops_its_links() {
    let app = build_test_app();
    let (_, token) = seed_user(&app, "a@example.com").await;
    let prompt = create_prompt(&app, &token, "hello").await;
    let tag = body_json(
        post_json(
            app.router(),
            &format!("/api/prompts/{prompt}/tags"),
            Some(&token),
            json!({"name": "temp"}),
        )
        .await,
    )
    .await["data"]["id"]
        .as_i64()
        .unwrap();

    let listed = body_json(get(app.router(), &format!("/api/tags/{tag}/prompts"), Some(&token)).await).await;
    assert_eq!(listed["data"][0]["id"], prompt);

    let response = delete(app.router(), &format!("/api/tags/{tag}"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(app.store().list_tags_for_prompt(prompt).await.unwrap().is_empty());
}
