// src/api/http/repository.rs

use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;

use super::PaginationParams;
use crate::api::error::{ApiError, ApiResult, IntoApiErrorOption, db_error};
use crate::repository::{CreateRepositoryRequest, Repository, UpdateRepositoryRequest};
use crate::state::AppState;

pub fn repository_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/repositories",
            get(list_repositories).post(create_repository),
        )
        .route(
            "/repositories/{repo_id}",
            get(get_repository)
                .patch(update_repository)
                .delete(delete_repository),
        )
}

async fn create_repository(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRepositoryRequest>,
) -> ApiResult<(StatusCode, Json<Repository>)> {
    if state
        .repositories
        .url_exists(&req.url)
        .await
        .map_err(|e| db_error("repository lookup", e))?
    {
        return Err(ApiError::conflict("Repository URL already registered"));
    }

    let repo = state
        .repositories
        .create(&req)
        .await
        .map_err(|e| db_error("repository create", e))?;

    Ok((StatusCode::CREATED, Json(repo)))
}

async fn get_repository(
    State(state): State<Arc<AppState>>,
    Path(repo_id): Path<i64>,
) -> ApiResult<Json<Repository>> {
    let repo = state
        .repositories
        .get(repo_id)
        .await
        .map_err(|e| db_error("repository lookup", e))?
        .ok_or_not_found("Repository not found")?;

    Ok(Json(repo))
}

async fn list_repositories(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<Vec<Repository>>> {
    let (skip, limit) = pagination.resolve(100)?;

    let repos = state
        .repositories
        .list(skip, limit)
        .await
        .map_err(|e| db_error("repository list", e))?;

    Ok(Json(repos))
}

async fn update_repository(
    State(state): State<Arc<AppState>>,
    Path(repo_id): Path<i64>,
    Json(req): Json<UpdateRepositoryRequest>,
) -> ApiResult<Json<Repository>> {
    let repo = state
        .repositories
        .update_description(repo_id, req.description.as_deref())
        .await
        .map_err(|e| db_error("repository update", e))?
        .ok_or_not_found("Repository not found")?;

    Ok(Json(repo))
}

async fn delete_repository(
    State(state): State<Arc<AppState>>,
    Path(repo_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let deleted = state
        .repositories
        .delete(repo_id)
        .await
        .map_err(|e| db_error("repository delete", e))?;

    if !deleted {
        return Err(ApiError::not_found("Repository not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
