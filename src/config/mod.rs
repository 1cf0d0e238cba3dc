// src/config/mod.rs
// Central configuration for the CodeNova review backend

pub mod helpers;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

lazy_static! {
    pub static ref CONFIG: NovaConfig = NovaConfig::from_env();
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: helpers::env_or("NOVA_HOST", "0.0.0.0"),
            port: helpers::env_parsed_or("NOVA_PORT", 8000),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self {
            // mode=rwc creates the database file on first start
            url: helpers::env_or("DATABASE_URL", "sqlite://codenova.db?mode=rwc"),
            max_connections: helpers::env_parsed_or("NOVA_SQLITE_MAX_CONNECTIONS", 5),
        }
    }
}

/// Gemini API configuration. An empty key is a supported configuration:
/// the reviewer runs in mock mode instead of failing at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: helpers::env_or("GEMINI_API_KEY", ""),
            model: helpers::env_or("GEMINI_MODEL", "gemini-1.5-flash"),
            timeout_secs: helpers::env_parsed_or("GEMINI_TIMEOUT_SECS", 120),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Token issuance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: helpers::env_or(
                "JWT_SECRET",
                "nova-jwt-secret-change-in-production-please",
            ),
            access_token_minutes: helpers::env_parsed_or("ACCESS_TOKEN_EXPIRE_MINUTES", 30),
            refresh_token_days: helpers::env_parsed_or("REFRESH_TOKEN_EXPIRE_DAYS", 7),
        }
    }
}

/// Main configuration structure - composes all domain configs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NovaConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub gemini: GeminiConfig,
    pub auth: AuthConfig,
}

impl NovaConfig {
    pub fn from_env() -> Self {
        // Don't panic if .env doesn't exist (for production)
        dotenv::dotenv().ok();

        Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            gemini: GeminiConfig::from_env(),
            auth: AuthConfig::from_env(),
        }
    }

    pub fn bind_address(&self) -> String {
        self.server.bind_address()
    }
}
