// src/repository/store.rs
// Database operations for registered repositories

use anyhow::Result;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::types::{CreateRepositoryRequest, Repository};
use crate::db::epoch_to_datetime;

pub struct RepositoryStore {
    pool: SqlitePool,
}

impl RepositoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, req: &CreateRepositoryRequest) -> Result<Repository> {
        let now = Utc::now().timestamp();

        let id = sqlx::query(
            "INSERT INTO repositories (name, url, description, user_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&req.name)
        .bind(&req.url)
        .bind(&req.description)
        .bind(req.user_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Repository {} vanished after insert", id))
    }

    pub async fn get(&self, repo_id: i64) -> Result<Option<Repository>> {
        let row = sqlx::query(
            "SELECT id, name, url, description, user_id, created_at, updated_at
             FROM repositories WHERE id = ?",
        )
        .bind(repo_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_repository(&r)))
    }

    pub async fn url_exists(&self, url: &str) -> Result<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM repositories WHERE url = ?")
            .bind(url)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0 > 0)
    }

    pub async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Repository>> {
        let rows = sqlx::query(
            "SELECT id, name, url, description, user_id, created_at, updated_at
             FROM repositories ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_repository).collect())
    }

    pub async fn update_description(
        &self,
        repo_id: i64,
        description: Option<&str>,
    ) -> Result<Option<Repository>> {
        if description.is_some() {
            let now = Utc::now().timestamp();
            sqlx::query("UPDATE repositories SET description = ?, updated_at = ? WHERE id = ?")
                .bind(description)
                .bind(now)
                .bind(repo_id)
                .execute(&self.pool)
                .await?;
        }

        self.get(repo_id).await
    }

    /// Delete a repository. Returns false when no row matched.
    pub async fn delete(&self, repo_id: i64) -> Result<bool> {
        let affected = sqlx::query("DELETE FROM repositories WHERE id = ?")
            .bind(repo_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }
}

fn row_to_repository(row: &SqliteRow) -> Repository {
    Repository {
        id: row.get("id"),
        name: row.get("name"),
        url: row.get("url"),
        description: row.get("description"),
        user_id: row.get("user_id"),
        created_at: epoch_to_datetime(row.get("created_at")),
        updated_at: epoch_to_datetime(row.get("updated_at")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> RepositoryStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::init_schema(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, role, created_at, updated_at)
             VALUES (1, 'a@b.c', 'x', 'guest', 0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();

        RepositoryStore::new(pool)
    }

    fn demo_request() -> CreateRepositoryRequest {
        CreateRepositoryRequest {
            name: "demo".to_string(),
            url: "https://example.com/demo.git".to_string(),
            description: Some("a demo repo".to_string()),
            user_id: 1,
        }
    }

    #[tokio::test]
    async fn create_get_update_delete() {
        let store = setup().await;

        let repo = store.create(&demo_request()).await.unwrap();
        assert_eq!(repo.name, "demo");
        assert!(store.url_exists(&repo.url).await.unwrap());

        let updated = store
            .update_description(repo.id, Some("new text"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.description.as_deref(), Some("new text"));

        assert!(store.delete(repo.id).await.unwrap());
        assert!(!store.delete(repo.id).await.unwrap());
        assert!(store.get(repo.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_respects_skip_and_limit() {
        let store = setup().await;

        for i in 0..3 {
            let mut req = demo_request();
            req.url = format!("https://example.com/repo{}.git", i);
            store.create(&req).await.unwrap();
        }

        assert_eq!(store.list(0, 100).await.unwrap().len(), 3);
        assert_eq!(store.list(2, 100).await.unwrap().len(), 1);
        assert_eq!(store.list(0, 2).await.unwrap().len(), 2);
    }
}
