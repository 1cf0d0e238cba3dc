// src/api/http/analysis.rs

use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use super::PaginationParams;
use crate::api::error::{ApiError, ApiResult, IntoApiErrorOption, db_error};
use crate::review::{
    AnalysisRecord, CodeReviewer, run_code_analysis, sample_snippet, spawn_analysis,
};
use crate::state::AppState;

const DEFAULT_COMMIT_REF: &str = "main";

#[derive(Debug, Deserialize)]
struct AnalysisRequest {
    repo_id: i64,
    commit_hash: Option<String>,
}

pub fn analysis_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analysis/trigger", post(trigger_analysis))
        .route("/analysis/trigger-sync", post(trigger_analysis_sync))
        .route("/analysis/test-review", get(test_review))
        .route("/analysis/analyses/{analysis_id}", get(get_analysis))
        .route(
            "/analysis/repositories/{repo_id}/analyses",
            get(list_repository_analyses),
        )
        .route(
            "/analysis/repositories/{repo_id}/analyses/latest",
            get(latest_repository_analysis),
        )
}

/// Commit refs accept branch names and partial or full hashes, nothing else.
fn validate_commit_ref(commit_hash: &str) -> ApiResult<()> {
    if commit_hash.is_empty() || commit_hash.len() > 64 {
        return Err(ApiError::unprocessable_entity(
            "commit_hash must be between 1 and 64 characters",
        ));
    }
    if !commit_hash
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '-'))
    {
        return Err(ApiError::unprocessable_entity(
            "commit_hash contains invalid characters",
        ));
    }
    Ok(())
}

async fn require_repository(state: &AppState, repo_id: i64) -> ApiResult<()> {
    state
        .repositories
        .get(repo_id)
        .await
        .map_err(|e| db_error("repository lookup", e))?
        .ok_or_not_found("Repository not found")?;
    Ok(())
}

async fn trigger_analysis(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalysisRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let commit_hash = req
        .commit_hash
        .unwrap_or_else(|| DEFAULT_COMMIT_REF.to_string());
    validate_commit_ref(&commit_hash)?;
    require_repository(&state, req.repo_id).await?;

    spawn_analysis(state.clone(), req.repo_id, commit_hash.clone());

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "message": format!(
                "Code analysis has been scheduled for repository {}.",
                req.repo_id
            ),
            "repo_id": req.repo_id,
            "commit_hash": commit_hash,
        })),
    ))
}

async fn trigger_analysis_sync(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalysisRequest>,
) -> ApiResult<Json<Value>> {
    let commit_hash = req
        .commit_hash
        .unwrap_or_else(|| DEFAULT_COMMIT_REF.to_string());
    validate_commit_ref(&commit_hash)?;
    require_repository(&state, req.repo_id).await?;

    let suggestions = run_code_analysis(&state, req.repo_id, &commit_hash)
        .await
        .map_err(|e| {
            tracing::error!("synchronous analysis failed: {e:#}");
            ApiError::internal("Code analysis failed")
        })?
        .ok_or_else(|| ApiError::internal("Analysis failed to produce results"))?;

    Ok(Json(json!({
        "status": "success",
        "repo_id": req.repo_id,
        "commit_hash": commit_hash,
        "review": suggestions,
    })))
}

async fn get_analysis(
    State(state): State<Arc<AppState>>,
    Path(analysis_id): Path<i64>,
) -> ApiResult<Json<AnalysisRecord>> {
    let record = state
        .analyses
        .get(analysis_id)
        .await
        .map_err(|e| db_error("analysis lookup", e))?
        .ok_or_not_found("Analysis not found")?;

    Ok(Json(record))
}

async fn list_repository_analyses(
    State(state): State<Arc<AppState>>,
    Path(repo_id): Path<i64>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<Vec<AnalysisRecord>>> {
    let (skip, limit) = pagination.resolve(50)?;
    require_repository(&state, repo_id).await?;

    let records = state
        .analyses
        .list_by_repository(repo_id, skip, limit)
        .await
        .map_err(|e| db_error("analysis list", e))?;

    Ok(Json(records))
}

async fn latest_repository_analysis(
    State(state): State<Arc<AppState>>,
    Path(repo_id): Path<i64>,
) -> ApiResult<Json<AnalysisRecord>> {
    require_repository(&state, repo_id).await?;

    let record = state
        .analyses
        .latest_for_repository(repo_id)
        .await
        .map_err(|e| db_error("analysis lookup", e))?
        .ok_or_not_found("No analyses found for this repository")?;

    Ok(Json(record))
}

/// Runs the reviewer against the built-in sample snippet without touching the
/// database. Handy for checking Gemini connectivity from a browser.
async fn test_review(State(state): State<Arc<AppState>>) -> Json<Value> {
    let suggestions = state.reviewer.review(sample_snippet()).await;
    Json(json!({
        "status": "success",
        "response": suggestions,
    }))
}
