//! Timer handle abstraction

use quizalarm_util::AlarmId;
use serde::{Deserialize, Serialize};

/// Opaque handle to an alarm registration on the device
///
/// Created by the device when a timer is registered. Two handles are equal
/// only if they refer to the same registration, so a firing that carries an
/// old handle can be told apart from the live one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle {
    /// Alarm the registration belongs to
    pub alarm_id: AlarmId,

    /// Platform-specific payload (opaque to core)
    payload: TimerHandlePayload,
}

impl TimerHandle {
    pub fn new(alarm_id: AlarmId, payload: TimerHandlePayload) -> Self {
        Self { alarm_id, payload }
    }

    pub fn payload(&self) -> &TimerHandlePayload {
        &self.payload
    }
}

/// Platform-specific handle payload
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "snake_case")]
pub enum TimerHandlePayload {
    /// Desktop: in-process timer task
    Desktop { id: u64 },

    /// Watch: native alarm id returned by the OS
    Watch { native_id: i64 },

    /// Mock for testing
    Mock { id: u64 },
}

impl TimerHandlePayload {
    /// Registration number for in-process timers
    pub fn local_id(&self) -> Option<u64> {
        match self {
            TimerHandlePayload::Desktop { id } | TimerHandlePayload::Mock { id } => Some(*id),
            TimerHandlePayload::Watch { .. } => None,
        }
    }
}
