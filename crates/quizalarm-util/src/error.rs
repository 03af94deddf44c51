//! Error types for quizalarm

use thiserror::Error;

use crate::AlarmId;

/// Core error type for quizalarm operations
#[derive(Debug, Error)]
pub enum QuizAlarmError {
    #[error("Alarm not found: {0}")]
    AlarmNotFound(AlarmId),

    #[error("No active session")]
    NoActiveSession,

    #[error("Session already active for alarm {0}")]
    SessionAlreadyActive(AlarmId),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Host error: {0}")]
    HostError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Insufficient balance: have {balance}, need at least {required}")]
    InsufficientBalance { balance: i64, required: i64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuizAlarmError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    pub fn host(msg: impl Into<String>) -> Self {
        Self::HostError(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the caller supplied bad input (prior state is kept)
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::AlarmNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, QuizAlarmError>;
