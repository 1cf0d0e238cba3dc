// tests/test_repository_api.rs
// CRUD tests for the repository endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{create_test_app, get_request, json_request, response_json, seed_user};

async fn create_repo(app: &axum::Router, name: &str, url: &str, user_id: i64) -> Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/repositories",
            &json!({"name": name, "url": url, "user_id": user_id}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await
}

#[tokio::test]
async fn create_and_fetch_repository() {
    let (app, state) = create_test_app().await;
    let owner = seed_user(&state, "owner@example.com").await;

    let repo = create_repo(&app, "widgets", "https://github.com/acme/widgets", owner).await;
    assert_eq!(repo["name"], "widgets");
    assert_eq!(repo["url"], "https://github.com/acme/widgets");
    assert_eq!(repo["user_id"], owner);
    assert!(repo["description"].is_null());
    let repo_id = repo["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(get_request(&format!("/repositories/{repo_id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = response_json(response).await;
    assert_eq!(fetched["id"], repo_id);
    assert_eq!(fetched["name"], "widgets");
}

#[tokio::test]
async fn duplicate_url_conflicts() {
    let (app, state) = create_test_app().await;
    let owner = seed_user(&state, "owner@example.com").await;
    create_repo(&app, "one", "https://github.com/acme/same", owner).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/repositories",
            &json!({"name": "two", "url": "https://github.com/acme/same", "user_id": owner}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = response_json(response).await;
    assert_eq!(body["detail"], "Repository URL already registered");
}

#[tokio::test]
async fn missing_repository_is_404() {
    let (app, _state) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(get_request("/repositories/9999", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["detail"], "Repository not found");
}

#[tokio::test]
async fn list_with_pagination() {
    let (app, state) = create_test_app().await;
    let owner = seed_user(&state, "owner@example.com").await;
    for i in 0..5 {
        create_repo(
            &app,
            &format!("repo-{i}"),
            &format!("https://git.example/{i}"),
            owner,
        )
        .await;
    }

    let response = app
        .clone()
        .oneshot(get_request("/repositories?skip=2&limit=2", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = response_json(response).await;
    let page = page.as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["name"], "repo-2");
    assert_eq!(page[1]["name"], "repo-3");
}

#[tokio::test]
async fn pagination_bounds_are_validated() {
    let (app, _state) = create_test_app().await;

    for uri in [
        "/repositories?skip=-1",
        "/repositories?limit=0",
        "/repositories?limit=500",
    ] {
        let response = app.clone().oneshot(get_request(uri, None)).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "{uri} should be rejected"
        );
    }
}

#[tokio::test]
async fn patch_updates_description() {
    let (app, state) = create_test_app().await;
    let owner = seed_user(&state, "owner@example.com").await;
    let repo = create_repo(&app, "widgets", "https://github.com/acme/widgets", owner).await;
    let repo_id = repo["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/repositories/{repo_id}"),
            &json!({"description": "internal widget factory"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = response_json(response).await;
    assert_eq!(updated["description"], "internal widget factory");
}

#[tokio::test]
async fn delete_removes_repository() {
    let (app, state) = create_test_app().await;
    let owner = seed_user(&state, "owner@example.com").await;
    let repo = create_repo(&app, "gone", "https://github.com/acme/gone", owner).await;
    let repo_id = repo["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method("DELETE")
                .uri(format!("/repositories/{repo_id}"))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/repositories/{repo_id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
