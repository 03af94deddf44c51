//! Device capability traits for quizalarm
//!
//! This crate defines the capability-based interface between the core
//! services and the device they run on (a watch, a desktop, a test mock).
//! It contains no platform code itself apart from the in-process mock.

mod capabilities;
mod handle;
mod http;
mod mock;
mod traits;

pub use capabilities::*;
pub use handle::*;
pub use http::*;
pub use mock::*;
pub use traits::*;
