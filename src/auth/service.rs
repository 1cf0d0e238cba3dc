// src/auth/service.rs

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::debug;

use crate::db::epoch_to_datetime;

use super::jwt::{
    TOKEN_TYPE_ACCESS, TOKEN_TYPE_REFRESH, create_access_token, create_refresh_token, verify_token,
};
use super::password::{hash_password, verify_password};
use super::{AccessToken, LoginRequest, RegisterRequest, TokenPair, User, UserRole};
use crate::config::CONFIG;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailTaken,
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error("User account is disabled")]
    Disabled,
    #[error("Could not validate credentials")]
    InvalidToken,
    #[error("Token not found")]
    TokenNotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("Database error")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub struct AuthService {
    db: SqlitePool,
}

impl AuthService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a new account. New users start as active, unverified guests.
    pub async fn register(&self, req: RegisterRequest) -> Result<User, AuthError> {
        if self.email_exists(&req.email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(&req.password)?;
        let now = Utc::now().timestamp();

        let user_id = sqlx::query(
            "INSERT INTO users
             (email, full_name, password_hash, role, is_active, is_verified, created_at, updated_at)
             VALUES (?, ?, ?, ?, 1, 0, ?, ?)",
        )
        .bind(&req.email)
        .bind(&req.full_name)
        .bind(&password_hash)
        .bind(UserRole::Guest.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await?
        .last_insert_rowid();

        debug!("Registered user {} ({})", user_id, req.email);
        self.get_user(user_id).await?.ok_or(AuthError::UserNotFound)
    }

    /// Verify credentials and issue an access/refresh token pair. The
    /// refresh token is persisted so it can be revoked later.
    pub async fn login(&self, req: LoginRequest) -> Result<TokenPair, AuthError> {
        let row = sqlx::query("SELECT id, password_hash, role, is_active FROM users WHERE email = ?")
            .bind(&req.email)
            .fetch_optional(&self.db)
            .await?;

        let Some(row) = row else {
            return Err(AuthError::InvalidCredentials);
        };

        let user_id: i64 = row.get("id");
        let password_hash: String = row.get("password_hash");
        let role = UserRole::from_str(row.get("role"));
        let is_active: bool = row.get("is_active");

        if !verify_password(&req.password, &password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        if !is_active {
            return Err(AuthError::Disabled);
        }

        let access_token = create_access_token(user_id, &req.email, role)?;
        let refresh_token = create_refresh_token(user_id, &req.email, role)?;

        let expires_at =
            (Utc::now() + chrono::Duration::days(CONFIG.auth.refresh_token_days)).timestamp();
        sqlx::query("INSERT INTO tokens (token, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(&refresh_token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.db)
            .await?;

        let now = Utc::now().timestamp();
        sqlx::query("UPDATE users SET last_login_at = ?, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(now)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
        })
    }

    /// Exchange a stored, unexpired refresh token for a fresh access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, AuthError> {
        let claims = verify_token(refresh_token).map_err(|_| AuthError::InvalidToken)?;
        if claims.token_type != TOKEN_TYPE_REFRESH {
            return Err(AuthError::InvalidToken);
        }

        let now = Utc::now().timestamp();
        let row = sqlx::query("SELECT user_id FROM tokens WHERE token = ? AND expires_at > ?")
            .bind(refresh_token)
            .bind(now)
            .fetch_optional(&self.db)
            .await?;

        let Some(row) = row else {
            return Err(AuthError::InvalidToken);
        };
        let user_id: i64 = row.get("user_id");

        let user = self.get_user(user_id).await?.ok_or(AuthError::InvalidToken)?;
        if !user.is_active {
            return Err(AuthError::InvalidToken);
        }

        let access_token = create_access_token(user.id, &user.email, user.role)?;
        Ok(AccessToken {
            access_token,
            token_type: "bearer".to_string(),
        })
    }

    /// Revoke a stored refresh token (logout).
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        let affected = sqlx::query("DELETE FROM tokens WHERE token = ?")
            .bind(refresh_token)
            .execute(&self.db)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(AuthError::TokenNotFound);
        }
        Ok(())
    }

    /// Resolve the bearer access token to an active user.
    pub async fn current_user(&self, access_token: &str) -> Result<User, AuthError> {
        let claims = verify_token(access_token).map_err(|_| AuthError::InvalidToken)?;
        if claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(AuthError::InvalidToken);
        }

        let user_id: i64 = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;
        let user = self.get_user(user_id).await?.ok_or(AuthError::InvalidToken)?;
        if !user.is_active {
            return Err(AuthError::InvalidToken);
        }

        Ok(user)
    }

    /// Change a user's role. Admin gating happens at the HTTP layer.
    pub async fn update_role(&self, user_id: i64, role: UserRole) -> Result<User, AuthError> {
        let now = Utc::now().timestamp();
        let affected = sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(now)
            .bind(user_id)
            .execute(&self.db)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(AuthError::UserNotFound);
        }
        self.get_user(user_id).await?.ok_or(AuthError::UserNotFound)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>, AuthError> {
        let row = sqlx::query(
            "SELECT id, email, full_name, role, is_active, is_verified,
             last_login_at, created_at, updated_at
             FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|r| row_to_user(&r)))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.db)
            .await?;

        Ok(count.0 > 0)
    }
}

fn row_to_user(row: &SqliteRow) -> User {
    let last_login_at: Option<i64> = row.get("last_login_at");

    User {
        id: row.get("id"),
        email: row.get("email"),
        full_name: row.get("full_name"),
        role: UserRole::from_str(row.get("role")),
        is_active: row.get("is_active"),
        is_verified: row.get("is_verified"),
        last_login_at: last_login_at.map(epoch_to_datetime),
        created_at: epoch_to_datetime(row.get("created_at")),
        updated_at: epoch_to_datetime(row.get("updated_at")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> AuthService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::init_schema(&pool).await.unwrap();
        AuthService::new(pool)
    }

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            email: "dev@example.com".to_string(),
            password: "hunter22".to_string(),
            full_name: Some("Dev Example".to_string()),
        }
    }

    #[tokio::test]
    async fn register_login_refresh_revoke_flow() {
        let service = setup().await;

        let user = service.register(register_request()).await.unwrap();
        assert_eq!(user.role, UserRole::Guest);
        assert!(user.is_active);
        assert!(user.last_login_at.is_none());

        let pair = service
            .login(LoginRequest {
                email: "dev@example.com".to_string(),
                password: "hunter22".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(pair.token_type, "bearer");

        let me = service.current_user(&pair.access_token).await.unwrap();
        assert_eq!(me.id, user.id);
        assert!(me.last_login_at.is_some());

        let refreshed = service.refresh(&pair.refresh_token).await.unwrap();
        assert!(service.current_user(&refreshed.access_token).await.is_ok());

        service.revoke(&pair.refresh_token).await.unwrap();
        assert!(matches!(
            service.refresh(&pair.refresh_token).await,
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            service.revoke(&pair.refresh_token).await,
            Err(AuthError::TokenNotFound)
        ));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let service = setup().await;
        service.register(register_request()).await.unwrap();

        assert!(matches!(
            service.register(register_request()).await,
            Err(AuthError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let service = setup().await;
        service.register(register_request()).await.unwrap();

        let result = service
            .login(LoginRequest {
                email: "dev@example.com".to_string(),
                password: "wrong".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn refresh_rejects_access_tokens() {
        let service = setup().await;
        service.register(register_request()).await.unwrap();
        let pair = service
            .login(LoginRequest {
                email: "dev@example.com".to_string(),
                password: "hunter22".to_string(),
            })
            .await
            .unwrap();

        // An access token is not exchangeable even though it verifies
        assert!(matches!(
            service.refresh(&pair.access_token).await,
            Err(AuthError::InvalidToken)
        ));
        // And a refresh token cannot authenticate a request
        assert!(matches!(
            service.current_user(&pair.refresh_token).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn role_update_round_trips() {
        let service = setup().await;
        let user = service.register(register_request()).await.unwrap();

        let updated = service.update_role(user.id, UserRole::Admin).await.unwrap();
        assert_eq!(updated.role, UserRole::Admin);

        assert!(matches!(
            service.update_role(9999, UserRole::Admin).await,
            Err(AuthError::UserNotFound)
        ));
    }
}
