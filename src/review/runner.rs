// src/review/runner.rs
// One analysis attempt: look up the repository, review the snippet, persist
// the outcome. Background dispatch runs the same path after the HTTP
// response has gone out, on a state handle the task owns.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::types::{AnalysisStatus, Suggestion};
use crate::state::AppState;

/// Stand-in for the source-retrieval collaborator. Pulling real code at a
/// commit is not implemented; every analysis reviews this fixed snippet.
pub fn sample_snippet() -> &'static str {
    r#"
def add(a, b):
    return a + b

class Calculator:
    def multiply(self, x, y):
        return x * y
"#
}

/// Run one analysis attempt for a repository at a commit ref.
///
/// Returns `Ok(None)` without writing anything when the repository does not
/// exist. On failure a best-effort `failed` record is persisted before the
/// original error is handed back to the caller.
pub async fn run_code_analysis(
    state: &AppState,
    repo_id: i64,
    commit_hash: &str,
) -> Result<Option<Vec<Suggestion>>> {
    if state.repositories.get(repo_id).await?.is_none() {
        warn!("Repository {} not found, skipping analysis", repo_id);
        return Ok(None);
    }

    info!(
        "Starting analysis for repo {} at commit {}",
        repo_id, commit_hash
    );

    match attempt(state, repo_id, commit_hash).await {
        Ok(suggestions) => {
            info!("Analysis completed for repo {}", repo_id);
            Ok(Some(suggestions))
        }
        Err(e) => {
            error!("Error during analysis for repo {}: {:#}", repo_id, e);

            let results = serde_json::json!({"error": e.to_string()});
            if let Err(write_err) = state
                .analyses
                .record(repo_id, commit_hash, AnalysisStatus::Failed, &results)
                .await
            {
                error!(
                    "Failed to persist failed analysis record for repo {}: {:#}",
                    repo_id, write_err
                );
            }

            Err(e)
        }
    }
}

async fn attempt(
    state: &AppState,
    repo_id: i64,
    commit_hash: &str,
) -> Result<Vec<Suggestion>> {
    // The reviewer never errors; it degrades to mock or error suggestions.
    let suggestions = state.reviewer.review(sample_snippet()).await;

    let results = serde_json::json!({"review": &suggestions});
    state
        .analyses
        .record(repo_id, commit_hash, AnalysisStatus::Completed, &results)
        .await?;

    Ok(suggestions)
}

/// Fire-and-forget dispatch: exactly one attempt per call, no retry, no
/// dedup of concurrent triggers for the same repository. The task owns its
/// own state handle since the request scope is gone by the time it runs.
pub fn spawn_analysis(state: Arc<AppState>, repo_id: i64, commit_hash: String) {
    tokio::spawn(async move {
        if let Err(e) = run_code_analysis(&state, repo_id, &commit_hash).await {
            error!("Background analysis failed for repo {}: {:#}", repo_id, e);
        }
    });
}
