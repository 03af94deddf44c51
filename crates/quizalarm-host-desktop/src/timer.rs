//! Recurring wall-clock timers on tokio tasks

use chrono::{DateTime, Duration as ChronoDuration, Local, TimeZone};
use quizalarm_host_api::{DeviceEvent, HostError, HostResult, TimerHandle, TimerHandlePayload, TimerSpec};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Upper bound on a single sleep, so wall-clock jumps are noticed
const MAX_SLEEP: Duration = Duration::from_secs(30);

/// Next time strictly after `after` at which `spec` fires.
///
/// Days without the repeat bit are skipped. A time that does not exist on a
/// given day (DST gap) skips that day.
pub fn next_occurrence(spec: &TimerSpec, after: DateTime<Local>) -> Option<DateTime<Local>> {
    let time = spec.clock.to_naive_time();
    let today = after.date_naive();

    (0..=7).find_map(|offset| {
        let date = today.checked_add_signed(ChronoDuration::days(offset))?;
        if !spec.repeat.fires_on_date(&date) {
            return None;
        }
        let candidate = Local.from_local_datetime(&date.and_time(time)).earliest()?;
        (candidate > after).then_some(candidate)
    })
}

struct TimerTask {
    spec: TimerSpec,
    task: JoinHandle<()>,
}

/// Timer registrations backed by one tokio task each
pub struct DesktopTimer {
    next_id: AtomicU64,
    tasks: Arc<Mutex<HashMap<u64, TimerTask>>>,
    event_tx: mpsc::UnboundedSender<DeviceEvent>,
    event_rx: Mutex<Option<mpsc::UnboundedReceiver<DeviceEvent>>>,
}

impl DesktopTimer {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            next_id: AtomicU64::new(1),
            tasks: Arc::new(Mutex::new(HashMap::new())),
            event_tx: tx,
            event_rx: Mutex::new(Some(rx)),
        }
    }

    fn tasks(&self) -> MutexGuard<'_, HashMap<u64, TimerTask>> {
        self.tasks.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Register a timer. Must be called inside a tokio runtime.
    pub fn register(&self, spec: TimerSpec) -> HostResult<TimerHandle> {
        if next_occurrence(&spec, quizalarm_util::now()).is_none() {
            return Err(HostError::ScheduleFailed(format!(
                "{} never occurs with repeat {}",
                spec.clock, spec.repeat
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let handle = TimerHandle::new(spec.alarm_id, TimerHandlePayload::Desktop { id });

        let task = tokio::spawn(run_timer(spec, handle.clone(), self.event_tx.clone()));
        self.tasks().insert(id, TimerTask { spec, task });

        info!(alarm_id = %spec.alarm_id, timer_id = id, time = %spec.clock, repeat = %spec.repeat, "Timer registered");
        Ok(handle)
    }

    pub fn cancel(&self, handle: &TimerHandle) -> HostResult<()> {
        let TimerHandlePayload::Desktop { id } = handle.payload() else {
            return Err(HostError::TimerNotFound);
        };

        let removed = self.tasks().remove(id).ok_or(HostError::TimerNotFound)?;
        removed.task.abort();
        debug!(alarm_id = %removed.spec.alarm_id, timer_id = id, "Timer cancelled");
        Ok(())
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<DeviceEvent> {
        match self.event_rx.lock().unwrap_or_else(|p| p.into_inner()).take() {
            Some(rx) => rx,
            None => {
                warn!("Timer events already subscribed; returning a closed channel");
                mpsc::unbounded_channel().1
            }
        }
    }

    pub fn live_count(&self) -> usize {
        self.tasks().len()
    }
}

impl Default for DesktopTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DesktopTimer {
    fn drop(&mut self) {
        for (_, timer) in self.tasks().drain() {
            timer.task.abort();
        }
    }
}

async fn run_timer(
    spec: TimerSpec,
    handle: TimerHandle,
    events: mpsc::UnboundedSender<DeviceEvent>,
) {
    loop {
        let Some(target) = next_occurrence(&spec, quizalarm_util::now()) else {
            warn!(alarm_id = %spec.alarm_id, "Timer has no next occurrence, stopping");
            return;
        };
        debug!(alarm_id = %spec.alarm_id, next = %target, "Timer waiting");

        loop {
            let remaining = (target - quizalarm_util::now())
                .to_std()
                .unwrap_or(Duration::ZERO);
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(remaining.min(MAX_SLEEP)).await;
        }

        info!(alarm_id = %spec.alarm_id, "Timer fired");
        let event = DeviceEvent::AlarmFired {
            alarm_id: spec.alarm_id,
            handle: handle.clone(),
        };
        if events.send(event).is_err() {
            debug!("No timer event listener, stopping");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, Weekday};
    use quizalarm_api::RepeatMask;
    use quizalarm_util::{AlarmId, WallClock};

    fn spec(hour: u8, minute: u8, repeat: RepeatMask) -> TimerSpec {
        TimerSpec {
            alarm_id: AlarmId::new(0),
            clock: WallClock::new(hour, minute).unwrap(),
            repeat,
        }
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        let naive = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap();
        Local.from_local_datetime(&naive).earliest().unwrap()
    }

    #[test]
    fn later_today() {
        // 2025-01-06 is a Monday
        let now = local(2025, 1, 6, 7, 0);
        let next = next_occurrence(&spec(8, 0, RepeatMask::WEEKDAYS), now).unwrap();
        assert_eq!(next, local(2025, 1, 6, 8, 0));
    }

    #[test]
    fn exact_time_rolls_forward() {
        let now = local(2025, 1, 6, 8, 0);
        let next = next_occurrence(&spec(8, 0, RepeatMask::EVERY_DAY), now).unwrap();
        assert_eq!(next, local(2025, 1, 7, 8, 0));
    }

    #[test]
    fn weekend_is_skipped() {
        // Friday evening
        let now = local(2025, 1, 10, 20, 0);
        let next = next_occurrence(&spec(8, 0, RepeatMask::WEEKDAYS), now).unwrap();
        assert_eq!(next.weekday(), Weekday::Mon);
        assert_eq!(next, local(2025, 1, 13, 8, 0));
    }

    #[test]
    fn single_day_mask() {
        let mut slots = [false; 7];
        slots[RepeatMask::weekday_slot(Weekday::Wed)] = true;
        let now = local(2025, 1, 9, 9, 0);
        let next = next_occurrence(&spec(6, 30, RepeatMask::new(slots)), now).unwrap();
        assert_eq!(next, local(2025, 1, 15, 6, 30));
    }

    #[test]
    fn empty_mask_fires_daily() {
        let now = local(2025, 1, 11, 23, 0);
        let next = next_occurrence(&spec(7, 0, RepeatMask::new([false; 7])), now).unwrap();
        assert_eq!(next, local(2025, 1, 12, 7, 0));
    }

    #[tokio::test]
    async fn register_and_cancel() {
        let timer = DesktopTimer::new();
        let handle = timer.register(spec(8, 0, RepeatMask::WEEKDAYS)).unwrap();
        let other = timer.register(spec(8, 0, RepeatMask::WEEKDAYS)).unwrap();
        assert_ne!(handle, other);
        assert_eq!(timer.live_count(), 2);

        timer.cancel(&handle).unwrap();
        assert_eq!(timer.live_count(), 1);
        assert!(matches!(timer.cancel(&handle), Err(HostError::TimerNotFound)));
    }

    #[tokio::test]
    async fn foreign_handle_rejected() {
        let timer = DesktopTimer::new();
        let handle = TimerHandle::new(AlarmId::new(0), TimerHandlePayload::Mock { id: 1 });
        assert!(matches!(timer.cancel(&handle), Err(HostError::TimerNotFound)));
    }
}
