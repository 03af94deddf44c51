//! Shared utilities for quizalarm
//!
//! This crate provides:
//! - ID types (AlarmId, QuestionId, SessionId)
//! - Time utilities (wall clock, monotonic time, epoch milliseconds)
//! - Error types
//! - Default paths for config and data directories

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
