//! Device capabilities model

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Describes what a device can do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    /// Has a haptic motor
    pub can_vibrate: bool,

    /// Has outbound network access
    pub can_reach_network: bool,

    /// Longest single vibration pulse the motor accepts
    pub max_vibration: Option<Duration>,
}

impl DeviceCapabilities {
    /// Alarms only, no haptics or network
    pub fn minimal() -> Self {
        Self {
            can_vibrate: false,
            can_reach_network: false,
            max_vibration: None,
        }
    }

    /// Everything a desktop host can offer
    pub fn desktop() -> Self {
        Self {
            can_vibrate: true,
            can_reach_network: true,
            max_vibration: None,
        }
    }

    /// Clamp a requested pulse to what the motor accepts
    pub fn clamp_vibration(&self, requested: Duration) -> Duration {
        match self.max_vibration {
            Some(max) => requested.min(max),
            None => requested,
        }
    }
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self::minimal()
    }
}
