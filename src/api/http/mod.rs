// src/api/http/mod.rs
// HTTP route handlers, grouped per resource.

pub mod analysis;
pub mod auth;
pub mod health;
pub mod repository;

use axum::{Router, response::Json, routing::get};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::state::AppState;

/// `?skip=&limit=` query parameters shared by the list endpoints.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationParams {
    /// Applies defaults and bounds. Limits above 200 are rejected rather
    /// than clamped so callers notice their mistake.
    pub fn resolve(&self, default_limit: i64) -> ApiResult<(i64, i64)> {
        let skip = self.skip.unwrap_or(0);
        let limit = self.limit.unwrap_or(default_limit);

        if skip < 0 {
            return Err(ApiError::unprocessable_entity("skip must be non-negative"));
        }
        if !(1..=200).contains(&limit) {
            return Err(ApiError::unprocessable_entity(
                "limit must be between 1 and 200",
            ));
        }
        Ok((skip, limit))
    }
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the CodeNova API" }))
}

/// Builds the full application router. State is attached by the caller.
pub fn app_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .merge(auth::auth_router())
        .merge(repository::repository_router())
        .merge(analysis::analysis_router())
}
