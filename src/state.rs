// src/state.rs

use anyhow::Result;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::CONFIG;
use crate::repository::RepositoryStore;
use crate::review::{AnalysisStore, CodeReviewer, GeminiReviewer};

/// Shared application state handed to every handler.
pub struct AppState {
    pub pool: SqlitePool,
    pub auth_service: Arc<AuthService>,
    pub repositories: Arc<RepositoryStore>,
    pub analyses: Arc<AnalysisStore>,
    pub reviewer: Arc<dyn CodeReviewer>,
}

impl AppState {
    /// Wires up stores and the Gemini reviewer from the global config.
    pub fn new(pool: SqlitePool) -> Result<Self> {
        let reviewer = Arc::new(GeminiReviewer::new(&CONFIG.gemini)?);
        Ok(Self::with_reviewer(pool, reviewer))
    }

    /// Same wiring with an explicit reviewer. Used by tests to stay off
    /// the network.
    pub fn with_reviewer(pool: SqlitePool, reviewer: Arc<dyn CodeReviewer>) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(pool.clone())),
            repositories: Arc::new(RepositoryStore::new(pool.clone())),
            analyses: Arc::new(AnalysisStore::new(pool.clone())),
            reviewer,
            pool,
        }
    }
}
