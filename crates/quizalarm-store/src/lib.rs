//! Persistence layer for quizalarm
//!
//! Provides:
//! - The get/set/has key-value capability over JSON values
//! - A SQLite-backed implementation
//! - Typed load/save helpers that fall back to defaults on corrupt data
//! - The names of every persisted key

mod sqlite;
mod traits;
mod typed;

pub mod keys;

pub use sqlite::*;
pub use traits::*;
pub use typed::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<StoreError> for quizalarm_util::QuizAlarmError {
    fn from(e: StoreError) -> Self {
        quizalarm_util::QuizAlarmError::store(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
