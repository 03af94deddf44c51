//! Device capability traits

use async_trait::async_trait;
use quizalarm_api::RepeatMask;
use quizalarm_util::{AlarmId, WallClock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::{DeviceCapabilities, HttpRequest, HttpResponse, TimerHandle};

/// Errors from device operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Schedule failed: {0}")]
    ScheduleFailed(String),

    #[error("Cancel failed: {0}")]
    CancelFailed(String),

    #[error("Timer not found")]
    TimerNotFound,

    #[error("Vibration failed: {0}")]
    VibrationFailed(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// What to register with the device alarm facility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSpec {
    pub alarm_id: AlarmId,
    pub clock: WallClock,
    pub repeat: RepeatMask,
}

/// Events raised by the device
#[derive(Debug, Clone)]
pub enum DeviceEvent {
    /// A registered timer went off
    AlarmFired {
        alarm_id: AlarmId,
        handle: TimerHandle,
    },
}

/// Recurring alarm registrations
#[async_trait]
pub trait AlarmTimer: Send + Sync {
    /// Get the capabilities of this device
    fn capabilities(&self) -> &DeviceCapabilities;

    /// Register a recurring timer. Each call yields a fresh handle.
    async fn set_recurring_timer(&self, spec: TimerSpec) -> HostResult<TimerHandle>;

    /// Remove a registration
    async fn cancel_timer(&self, handle: &TimerHandle) -> HostResult<()>;

    /// Take the firing channel. Only the first call receives events.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<DeviceEvent>;

    fn is_healthy(&self) -> bool {
        true
    }
}

/// Haptic output
#[async_trait]
pub trait Vibrator: Send + Sync {
    /// Vibrate for `duration`, replacing any pulse in progress
    async fn vibrate(&self, duration: Duration) -> HostResult<()>;

    /// Stop any vibration in progress
    async fn stop(&self) -> HostResult<()>;
}

/// Outbound HTTP
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform a request. Non-2xx statuses are returned, not errors.
    async fn request(&self, request: HttpRequest) -> HostResult<HttpResponse>;
}
