//! Core services for quizalarm
//!
//! This crate is the heart of quizalarmd, containing:
//! - Alarm definitions and their device timer registrations
//! - The dismissal session state machine (Selecting -> Active -> Dismissed/Expired)
//! - Points ledger and question pool
//! - Single-flight synchronization with the backend

mod activity;
mod defaults;
mod dismissal;
mod engine;
mod events;
mod ledger;
mod questions;
mod registry;
mod scheduler;
mod session;
mod sync;

pub use activity::*;
pub use defaults::*;
pub use dismissal::*;
pub use engine::*;
pub use events::*;
pub use ledger::*;
pub use questions::*;
pub use registry::*;
pub use scheduler::*;
pub use session::*;
pub use sync::*;
