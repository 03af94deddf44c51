//! Sync backend for quizalarm
//!
//! Devices push their points balance and history here and pull the shared
//! configuration (conversion rate and question pool). This crate contains:
//! - A SQLite repository for users, history rows and configuration keys
//! - The axum router implementing the sync and config endpoints

pub mod http;
pub mod repository;

pub use http::{AppState, create_router};
pub use repository::{Repository, RepositoryError, RepositoryResult};
