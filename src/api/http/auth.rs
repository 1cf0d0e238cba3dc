// src/api/http/auth.rs

use axum::{
    Router,
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, post, put},
};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::auth::{
    LoginRequest, RefreshRequest, RegisterRequest, RoleUpdateRequest, User, UserRole,
};
use crate::state::AppState;

pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh-token", post(refresh_token))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .route("/auth/users/{user_id}/role", put(update_user_role))
        .route("/auth/password-reset-request", post(password_reset_request))
        .route("/auth/password-reset", post(password_reset))
}

/// Pull the bearer token out of the Authorization header.
fn bearer_token(headers: &HeaderMap) -> ApiResult<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::unauthorized("Could not validate credentials"))
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> ApiResult<User> {
    let token = bearer_token(headers)?;
    Ok(state.auth_service.current_user(token).await?)
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.auth_service.register(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<crate::auth::TokenPair>> {
    let tokens = state.auth_service.login(req).await?;
    Ok(Json(tokens))
}

async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<crate::auth::AccessToken>> {
    let token = state.auth_service.refresh(&req.refresh_token).await?;
    Ok(Json(token))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    authenticate(&state, &headers).await?;
    state.auth_service.revoke(&req.refresh_token).await?;
    Ok(Json(serde_json::json!({"message": "Successfully logged out"})))
}

async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<User>> {
    let user = authenticate(&state, &headers).await?;
    Ok(Json(user))
}

/// Update a user's role (admin only).
async fn update_user_role(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
    Json(req): Json<RoleUpdateRequest>,
) -> ApiResult<Json<User>> {
    let caller = authenticate(&state, &headers).await?;
    if caller.role != UserRole::Admin {
        return Err(ApiError::forbidden("Not enough permissions"));
    }

    let user = state.auth_service.update_role(user_id, req.role).await?;
    Ok(Json(user))
}

// Password reset is acknowledged but not implemented: no reset tokens are
// issued or validated.

async fn password_reset_request() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "If your email is registered, you will receive a password reset link"
    }))
}

async fn password_reset() -> Json<serde_json::Value> {
    Json(serde_json::json!({"message": "Password has been reset successfully"}))
}
