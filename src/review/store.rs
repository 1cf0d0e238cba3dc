// src/review/store.rs
// Database operations for analysis records

use anyhow::Result;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::types::{AnalysisRecord, AnalysisStatus};
use crate::db::epoch_to_datetime;

/// Database store for analysis attempts. One row per attempt, written at
/// completion and never mutated afterwards.
pub struct AnalysisStore {
    pool: SqlitePool,
}

impl AnalysisStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist the outcome of one attempt. `status` is `completed` or
    /// `failed`; both stamp `completed_at`.
    pub async fn record(
        &self,
        repository_id: i64,
        commit_hash: &str,
        status: AnalysisStatus,
        results: &serde_json::Value,
    ) -> Result<i64> {
        let now = Utc::now().timestamp();

        let id = sqlx::query(
            "INSERT INTO analyses
             (repository_id, commit_hash, status, results, created_at, completed_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(repository_id)
        .bind(commit_hash)
        .bind(status.as_str())
        .bind(results.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    pub async fn get(&self, analysis_id: i64) -> Result<Option<AnalysisRecord>> {
        let row = sqlx::query(
            "SELECT id, repository_id, commit_hash, status, results, created_at, completed_at
             FROM analyses WHERE id = ?",
        )
        .bind(analysis_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_record(&r)))
    }

    /// List attempts for a repository, newest first.
    pub async fn list_by_repository(
        &self,
        repository_id: i64,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<AnalysisRecord>> {
        let rows = sqlx::query(
            "SELECT id, repository_id, commit_hash, status, results, created_at, completed_at
             FROM analyses WHERE repository_id = ?
             ORDER BY created_at DESC, id DESC
             LIMIT ? OFFSET ?",
        )
        .bind(repository_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_record).collect())
    }

    pub async fn latest_for_repository(
        &self,
        repository_id: i64,
    ) -> Result<Option<AnalysisRecord>> {
        let row = sqlx::query(
            "SELECT id, repository_id, commit_hash, status, results, created_at, completed_at
             FROM analyses WHERE repository_id = ?
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
        )
        .bind(repository_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_record(&r)))
    }

    pub async fn count_for_repository(&self, repository_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM analyses WHERE repository_id = ?")
            .bind(repository_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

fn row_to_record(row: &SqliteRow) -> AnalysisRecord {
    let results: Option<String> = row.get("results");
    let completed_at: Option<i64> = row.get("completed_at");

    AnalysisRecord {
        id: row.get("id"),
        repository_id: row.get("repository_id"),
        commit_hash: row.get("commit_hash"),
        status: AnalysisStatus::from_str(row.get("status")),
        results: results.and_then(|s| serde_json::from_str(&s).ok()),
        created_at: epoch_to_datetime(row.get("created_at")),
        completed_at: completed_at.map(epoch_to_datetime),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> AnalysisStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::init_schema(&pool).await.unwrap();

        // Satisfy the foreign keys
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, role, created_at, updated_at)
             VALUES (1, 'a@b.c', 'x', 'guest', 0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO repositories (id, name, url, user_id, created_at, updated_at)
             VALUES (1, 'demo', 'https://example.com/demo.git', 1, 0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();

        AnalysisStore::new(pool)
    }

    #[tokio::test]
    async fn record_and_get_round_trip() {
        let store = setup().await;
        let results = serde_json::json!({"review": [{"file_path": "a.py", "line_number": 1, "comment": "x"}]});

        let id = store
            .record(1, "main", AnalysisStatus::Completed, &results)
            .await
            .unwrap();

        let record = store.get(id).await.unwrap().unwrap();
        assert_eq!(record.repository_id, 1);
        assert_eq!(record.commit_hash, "main");
        assert_eq!(record.status, AnalysisStatus::Completed);
        assert_eq!(record.results.unwrap(), results);
        assert!(record.completed_at.is_some());
    }

    #[tokio::test]
    async fn latest_returns_most_recent_attempt() {
        let store = setup().await;
        let results = serde_json::json!({"review": []});

        store
            .record(1, "first", AnalysisStatus::Completed, &results)
            .await
            .unwrap();
        store
            .record(1, "second", AnalysisStatus::Failed, &results)
            .await
            .unwrap();

        let latest = store.latest_for_repository(1).await.unwrap().unwrap();
        assert_eq!(latest.commit_hash, "second");
        assert_eq!(latest.status, AnalysisStatus::Failed);

        let all = store.list_by_repository(1, 0, 50).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].commit_hash, "second");

        let page = store.list_by_repository(1, 1, 50).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].commit_hash, "first");
    }

    #[tokio::test]
    async fn count_tracks_inserts() {
        let store = setup().await;
        assert_eq!(store.count_for_repository(1).await.unwrap(), 0);

        store
            .record(1, "main", AnalysisStatus::Completed, &serde_json::json!({"review": []}))
            .await
            .unwrap();
        assert_eq!(store.count_for_repository(1).await.unwrap(), 1);
    }
}
