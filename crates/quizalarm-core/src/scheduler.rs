//! Alarm scheduler
//!
//! Keeps device timer registrations consistent with the stored alarm
//! definitions. The `AlarmId -> TimerHandle` map is the only owner of device
//! handles; at most one live handle exists per alarm.

use quizalarm_api::{Alarm, AlarmPatch};
use quizalarm_host_api::{AlarmTimer, TimerHandle, TimerSpec};
use quizalarm_util::{AlarmId, QuizAlarmError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::AlarmRegistry;

pub struct AlarmScheduler {
    timer: Arc<dyn AlarmTimer>,
    registry: Arc<AlarmRegistry>,
    handles: Mutex<HashMap<AlarmId, TimerHandle>>,
    // Serializes cancel-then-register sequences across awaits
    ops: tokio::sync::Mutex<()>,
}

impl AlarmScheduler {
    pub fn new(timer: Arc<dyn AlarmTimer>, registry: Arc<AlarmRegistry>) -> Self {
        Self {
            timer,
            registry,
            handles: Mutex::new(HashMap::new()),
            ops: tokio::sync::Mutex::new(()),
        }
    }

    fn handles(&self) -> MutexGuard<'_, HashMap<AlarmId, TimerHandle>> {
        self.handles.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Arm every enabled alarm. Returns how many were armed.
    pub async fn initialize(&self) -> usize {
        let enabled: Vec<Alarm> = self
            .registry
            .all()
            .into_iter()
            .filter(|a| a.enabled)
            .collect();

        let mut armed = 0;
        for alarm in &enabled {
            if self.schedule(alarm).await {
                armed += 1;
            }
        }

        info!(armed, enabled = enabled.len(), "Alarm scheduler initialized");
        armed
    }

    /// Register `alarm` with the device, replacing any live registration.
    ///
    /// Returns false if the device refused; storage is never touched.
    pub async fn schedule(&self, alarm: &Alarm) -> bool {
        let _op = self.ops.lock().await;
        self.schedule_locked(alarm).await
    }

    async fn schedule_locked(&self, alarm: &Alarm) -> bool {
        self.cancel_locked(alarm.id).await;

        let Some(clock) = alarm.clock() else {
            warn!(alarm_id = %alarm.id, hour = alarm.hour, minute = alarm.minute, "Alarm time out of range, not scheduling");
            return false;
        };

        let spec = TimerSpec {
            alarm_id: alarm.id,
            clock,
            repeat: alarm.repeat,
        };

        match self.timer.set_recurring_timer(spec).await {
            Ok(handle) => {
                debug!(alarm_id = %alarm.id, time = %clock, repeat = %alarm.repeat, "Alarm scheduled");
                self.handles().insert(alarm.id, handle);
                true
            }
            Err(e) => {
                warn!(alarm_id = %alarm.id, error = %e, "Failed to schedule alarm");
                false
            }
        }
    }

    /// Remove the registration for `id`. Returns false if none was live.
    pub async fn cancel(&self, id: AlarmId) -> bool {
        let _op = self.ops.lock().await;
        self.cancel_locked(id).await
    }

    async fn cancel_locked(&self, id: AlarmId) -> bool {
        let Some(handle) = self.handles().remove(&id) else {
            return false;
        };

        if let Err(e) = self.timer.cancel_timer(&handle).await {
            // Entry is already gone from the map; the device handle is stale
            warn!(alarm_id = %id, error = %e, "Failed to cancel alarm timer");
        } else {
            debug!(alarm_id = %id, "Alarm cancelled");
        }
        true
    }

    /// Cancel every live registration. Returns how many were removed.
    pub async fn cancel_all(&self) -> usize {
        let _op = self.ops.lock().await;
        let ids: Vec<AlarmId> = self.handles().keys().copied().collect();

        let mut cancelled = 0;
        for id in ids {
            if self.cancel_locked(id).await {
                cancelled += 1;
            }
        }
        cancelled
    }

    /// Flip `enabled`, persist, then arm or disarm. Returns the new state.
    pub async fn toggle(&self, id: AlarmId) -> Result<bool> {
        let _op = self.ops.lock().await;

        let current = self
            .registry
            .find(id)
            .ok_or(QuizAlarmError::AlarmNotFound(id))?;
        let alarm = self.registry.set_enabled(id, !current.enabled)?;

        if alarm.enabled {
            self.schedule_locked(&alarm).await;
        } else {
            self.cancel_locked(id).await;
        }

        info!(alarm_id = %id, enabled = alarm.enabled, "Alarm toggled");
        Ok(alarm.enabled)
    }

    /// Merge `patch`, validate, persist, then re-arm or disarm
    pub async fn update(&self, id: AlarmId, patch: AlarmPatch) -> Result<Alarm> {
        let _op = self.ops.lock().await;

        let current = self
            .registry
            .find(id)
            .ok_or(QuizAlarmError::AlarmNotFound(id))?;
        let updated = patch.apply_to(&current);
        self.registry.upsert(updated.clone())?;

        if updated.enabled {
            self.schedule_locked(&updated).await;
        } else {
            self.cancel_locked(id).await;
        }

        info!(alarm_id = %id, time = %updated.time_label(), enabled = updated.enabled, "Alarm updated");
        Ok(updated)
    }

    /// Whether a firing carrying `handle` comes from the live registration
    pub fn resolve_fired(&self, id: AlarmId, handle: &TimerHandle) -> bool {
        self.handles().get(&id).is_some_and(|live| live == handle)
    }

    pub fn live_handle(&self, id: AlarmId) -> Option<TimerHandle> {
        self.handles().get(&id).cloned()
    }

    pub fn armed_count(&self) -> usize {
        self.handles().len()
    }
}
