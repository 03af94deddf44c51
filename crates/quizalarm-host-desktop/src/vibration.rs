//! Vibration stand-in for machines without a motor

use quizalarm_host_api::HostResult;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Logs each pulse and remembers when the current one ends
#[derive(Debug, Default)]
pub struct LogVibrator {
    until: Mutex<Option<Instant>>,
    pulses: Mutex<u64>,
}

impl LogVibrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulse(&self, duration: Duration) -> HostResult<()> {
        *self.until.lock().unwrap_or_else(|p| p.into_inner()) = Some(Instant::now() + duration);
        let mut pulses = self.pulses.lock().unwrap_or_else(|p| p.into_inner());
        *pulses += 1;
        debug!(ms = duration.as_millis() as u64, pulse = *pulses, "Vibrate");
        Ok(())
    }

    pub fn stop(&self) -> HostResult<()> {
        let was_on = self
            .until
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take()
            .is_some();
        if was_on {
            info!(pulses = self.pulse_count(), "Vibration stopped");
        }
        Ok(())
    }

    /// Whether a pulse is still running
    pub fn is_vibrating(&self) -> bool {
        self.until
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .is_some_and(|until| Instant::now() < until)
    }

    pub fn pulse_count(&self) -> u64 {
        *self.pulses.lock().unwrap_or_else(|p| p.into_inner())
    }
}
