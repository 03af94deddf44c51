//! Desktop device implementation for quizalarmd
//!
//! Provides:
//! - Recurring wall-clock alarm timers on tokio tasks, honouring weekday masks
//! - A vibrator stand-in that logs pulses
//! - HTTP transport over reqwest with per-request timeouts

mod adapter;
mod http;
mod timer;
mod vibration;

pub use adapter::*;
pub use http::*;
pub use timer::*;
pub use vibration::*;
