//! Domain and wire types for quizalarm
//!
//! This crate defines the data shared between the device service and the
//! sync backend:
//! - Alarm definitions, repeat masks and partial updates
//! - The question pool and points history
//! - Dismissal session views
//! - Request/response bodies of the sync HTTP contract

mod session;
mod types;
mod wire;

pub use session::*;
pub use types::*;
pub use wire::*;

/// Number of slots in the question pool
pub const QUESTION_POOL_SIZE: usize = 30;

/// Number of alarm definitions created at first run
pub const DEFAULT_ALARM_COUNT: u32 = 10;

/// Points are redeemed in multiples of this unit
pub const REDEEM_UNIT: i64 = 1000;

/// Maximum number of history entries kept on the device
pub const HISTORY_CAP: usize = 500;

/// Default points-to-currency conversion rate
pub const DEFAULT_TND_RATE: f64 = 0.001;

/// Default session time limit, persisted as `vibration_duration`
pub const DEFAULT_VIBRATION_DURATION_MS: u64 = 300_000;
