// src/lib.rs

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod repository;
pub mod review;
pub mod state;

// Export commonly used items
pub use config::CONFIG;
pub use state::AppState;
