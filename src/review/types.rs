// src/review/types.rs
// Types shared across the review pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The canonical severity labels the model is asked to use.
pub const SEVERITY_LEVELS: [&str; 6] = ["info", "low", "medium", "high", "critical", "suggestion"];

/// One finding produced by the review pipeline.
///
/// `severity` stays a free string: the prompt constrains the model to the
/// canonical labels, but unknown values coming back are preserved rather
/// than rejected, and a missing severity is never defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub file_path: String,
    pub line_number: i64,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

impl Suggestion {
    /// A suggestion with no severity, the shape every synthetic fallback uses.
    pub fn plain(file_path: impl Into<String>, line_number: i64, comment: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            line_number,
            comment: comment.into(),
            severity: None,
        }
    }
}

/// Lifecycle of one analysis attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Pending,
        }
    }
}

/// One persisted attempt to review a repository at a commit.
///
/// Rows are written exactly once, at completion: `results` and
/// `completed_at` are present iff status is `completed` or `failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: i64,
    pub repository_id: i64,
    pub commit_hash: String,
    pub status: AnalysisStatus,
    pub results: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
