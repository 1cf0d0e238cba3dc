// src/auth/jwt.rs

use anyhow::{Result, anyhow};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserRole;
use crate::config::CONFIG;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub role: String,
    pub token_type: String,
    pub jti: String, // unique per token, keeps stored refresh tokens distinct
    pub exp: usize,
    pub iat: usize,
}

/// Short-lived token carried in the Authorization header.
pub fn create_access_token(user_id: i64, email: &str, role: UserRole) -> Result<String> {
    let minutes = CONFIG.auth.access_token_minutes;
    create_token(user_id, email, role, TOKEN_TYPE_ACCESS, chrono::Duration::minutes(minutes))
}

/// Long-lived token persisted server-side and exchanged for access tokens.
pub fn create_refresh_token(user_id: i64, email: &str, role: UserRole) -> Result<String> {
    let days = CONFIG.auth.refresh_token_days;
    create_token(user_id, email, role, TOKEN_TYPE_REFRESH, chrono::Duration::days(days))
}

fn create_token(
    user_id: i64,
    email: &str,
    role: UserRole,
    token_type: &str,
    lifetime: chrono::Duration,
) -> Result<String> {
    let now = chrono::Utc::now();
    let expiration = now
        .checked_add_signed(lifetime)
        .ok_or_else(|| anyhow!("Failed to calculate expiration"))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.as_str().to_string(),
        token_type: token_type.to_string(),
        jti: Uuid::new_v4().to_string(),
        exp: expiration,
        iat: now.timestamp() as usize,
    };

    let header = Header::default();
    let key = EncodingKey::from_secret(CONFIG.auth.jwt_secret.as_bytes());

    encode(&header, &claims, &key).map_err(|e| anyhow!("Failed to create token: {}", e))
}

pub fn verify_token(token: &str) -> Result<Claims> {
    let key = DecodingKey::from_secret(CONFIG.auth.jwt_secret.as_bytes());
    let validation = Validation::default();

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| anyhow!("Invalid token: {}", e))
}
