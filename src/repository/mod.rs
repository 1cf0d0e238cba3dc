// src/repository/mod.rs

pub mod store;
pub mod types;

pub use store::RepositoryStore;
pub use types::{CreateRepositoryRequest, Repository, UpdateRepositoryRequest};
