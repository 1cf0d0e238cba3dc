// tests/common/mod.rs
// Shared helpers for the HTTP API tests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

use nova_backend::api::app_router;
use nova_backend::config::GeminiConfig;
use nova_backend::db;
use nova_backend::review::GeminiReviewer;
use nova_backend::state::AppState;

/// Build an application state backed by a fresh in-memory database.
///
/// A single connection keeps every query on the same in-memory database;
/// with more, each pooled connection would see its own empty one. The
/// reviewer is built with an empty API key so it always runs in mock mode
/// and never touches the network.
pub async fn create_test_state() -> Arc<AppState> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");

    db::init_schema(&pool).await.expect("schema");

    let gemini = GeminiConfig {
        api_key: String::new(),
        model: "gemini-1.5-flash".to_string(),
        timeout_secs: 5,
    };
    let reviewer = Arc::new(GeminiReviewer::new(&gemini).expect("reviewer"));

    Arc::new(AppState::with_reviewer(pool, reviewer))
}

pub async fn create_test_app() -> (Router, Arc<AppState>) {
    let state = create_test_state().await;
    (app_router().with_state(state.clone()), state)
}

/// Insert a user row directly so repositories have an owner to reference.
pub async fn seed_user(state: &AppState, email: &str) -> i64 {
    let now = chrono::Utc::now().timestamp();
    let result = sqlx::query(
        "INSERT INTO users (email, password_hash, role, is_verified, created_at, updated_at)
         VALUES (?, 'not-a-real-hash', 'developer', 1, ?, ?)",
    )
    .bind(email)
    .bind(now)
    .bind(now)
    .execute(&state.pool)
    .await
    .expect("seed user");
    result.last_insert_rowid()
}

/// JSON request without auth.
pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// JSON request with a bearer token attached.
pub fn authed_json_request(method: &str, uri: &str, token: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// Bodyless GET, optionally authenticated.
pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

pub async fn response_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}
