//! HTTP layer of the sync backend
//!
//! Handlers parse and validate request bodies, then call straight into the
//! [`Repository`](crate::Repository). Response shapes follow the device sync
//! contract in `quizalarm-api`.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
