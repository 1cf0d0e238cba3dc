// src/review/mod.rs
// The review pipeline: normalizer, AI client adapter, runner, persistence

pub mod normalizer;
pub mod reviewer;
pub mod runner;
pub mod store;
pub mod types;

pub use normalizer::normalize_review;
pub use reviewer::{CodeReviewer, GeminiReviewer};
pub use runner::{run_code_analysis, sample_snippet, spawn_analysis};
pub use store::AnalysisStore;
pub use types::{AnalysisRecord, AnalysisStatus, Suggestion};
