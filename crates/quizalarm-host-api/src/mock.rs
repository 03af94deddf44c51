//! Mock device for testing

use async_trait::async_trait;
use quizalarm_util::AlarmId;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{Semaphore, mpsc};

use crate::{
    AlarmTimer, DeviceCapabilities, DeviceEvent, HostError, HostResult, HttpRequest,
    HttpResponse, HttpTransport, TimerHandle, TimerHandlePayload, TimerSpec, Vibrator,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A live mock timer registration
#[derive(Debug, Clone)]
pub struct MockTimer {
    pub handle: TimerHandle,
    pub spec: TimerSpec,
}

/// Recorded vibrator call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VibrationCall {
    Pulse(Duration),
    Stop,
}

/// Scripted reply for the next HTTP request
#[derive(Debug, Clone)]
pub enum MockReply {
    Response(HttpResponse),
    Failure(String),
}

/// Mock device for unit/integration testing
///
/// Implements every capability trait in-process. Timers never fire on their
/// own; tests call [`MockDevice::fire`].
pub struct MockDevice {
    capabilities: DeviceCapabilities,
    next_id: AtomicU64,
    timers: Arc<Mutex<HashMap<u64, MockTimer>>>,
    registrations: AtomicU64,
    event_tx: mpsc::UnboundedSender<DeviceEvent>,
    event_rx: Arc<Mutex<Option<mpsc::UnboundedReceiver<DeviceEvent>>>>,
    vibrations: Arc<Mutex<Vec<VibrationCall>>>,
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    gate: Arc<Mutex<Option<Arc<Semaphore>>>>,

    /// Configure timer registration to fail
    pub fail_schedule: Arc<Mutex<bool>>,

    /// Configure timer cancellation to fail
    pub fail_cancel: Arc<Mutex<bool>>,
}

impl MockDevice {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            capabilities: DeviceCapabilities::desktop(),
            next_id: AtomicU64::new(1),
            timers: Arc::new(Mutex::new(HashMap::new())),
            registrations: AtomicU64::new(0),
            event_tx: tx,
            event_rx: Arc::new(Mutex::new(Some(rx))),
            vibrations: Arc::new(Mutex::new(Vec::new())),
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            gate: Arc::new(Mutex::new(None)),
            fail_schedule: Arc::new(Mutex::new(false)),
            fail_cancel: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_capabilities(mut self, caps: DeviceCapabilities) -> Self {
        self.capabilities = caps;
        self
    }

    pub fn set_fail_schedule(&self, fail: bool) {
        *lock(&self.fail_schedule) = fail;
    }

    pub fn set_fail_cancel(&self, fail: bool) {
        *lock(&self.fail_cancel) = fail;
    }

    /// Live registrations
    pub fn live_timers(&self) -> Vec<MockTimer> {
        let mut timers: Vec<MockTimer> = lock(&self.timers).values().cloned().collect();
        timers.sort_by_key(|t| t.handle.payload().local_id());
        timers
    }

    pub fn live_timer_count(&self) -> usize {
        lock(&self.timers).len()
    }

    pub fn live_timers_for(&self, alarm_id: AlarmId) -> Vec<TimerHandle> {
        lock(&self.timers)
            .values()
            .filter(|t| t.spec.alarm_id == alarm_id)
            .map(|t| t.handle.clone())
            .collect()
    }

    /// Total successful registrations ever made
    pub fn registration_count(&self) -> u64 {
        self.registrations.load(Ordering::SeqCst)
    }

    /// Simulate the live timer for `alarm_id` going off
    pub fn fire(&self, alarm_id: AlarmId) -> bool {
        let handle = lock(&self.timers)
            .values()
            .find(|t| t.spec.alarm_id == alarm_id)
            .map(|t| t.handle.clone());

        match handle {
            Some(handle) => self.fire_handle(handle),
            None => false,
        }
    }

    /// Deliver a firing for an arbitrary handle, live or not
    pub fn fire_handle(&self, handle: TimerHandle) -> bool {
        self.event_tx
            .send(DeviceEvent::AlarmFired {
                alarm_id: handle.alarm_id,
                handle,
            })
            .is_ok()
    }

    pub fn vibrations(&self) -> Vec<VibrationCall> {
        lock(&self.vibrations).clone()
    }

    pub fn pulse_count(&self) -> usize {
        lock(&self.vibrations)
            .iter()
            .filter(|c| matches!(c, VibrationCall::Pulse(_)))
            .count()
    }

    /// Queue a response for the next request
    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        lock(&self.replies).push_back(MockReply::Response(HttpResponse::new(status, body)));
    }

    /// Queue a transport failure for the next request
    pub fn push_failure(&self, message: impl Into<String>) {
        lock(&self.replies).push_back(MockReply::Failure(message.into()));
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Hold every subsequent request until [`MockDevice::release_requests`]
    pub fn hold_requests(&self) {
        *lock(&self.gate) = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let held requests complete
    pub fn release_requests(&self) {
        if let Some(gate) = lock(&self.gate).take() {
            gate.close();
        }
    }

    /// Poll until at least `count` requests have arrived or `timeout` passes
    pub async fn wait_for_requests(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.request_count() < count {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        true
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlarmTimer for MockDevice {
    fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    async fn set_recurring_timer(&self, spec: TimerSpec) -> HostResult<TimerHandle> {
        if *lock(&self.fail_schedule) {
            return Err(HostError::ScheduleFailed("Mock schedule failure".into()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let handle = TimerHandle::new(spec.alarm_id, TimerHandlePayload::Mock { id });

        lock(&self.timers).insert(
            id,
            MockTimer {
                handle: handle.clone(),
                spec,
            },
        );
        self.registrations.fetch_add(1, Ordering::SeqCst);

        Ok(handle)
    }

    async fn cancel_timer(&self, handle: &TimerHandle) -> HostResult<()> {
        if *lock(&self.fail_cancel) {
            return Err(HostError::CancelFailed("Mock cancel failure".into()));
        }

        let id = match handle.payload() {
            TimerHandlePayload::Mock { id } => *id,
            _ => return Err(HostError::TimerNotFound),
        };

        match lock(&self.timers).remove(&id) {
            Some(_) => Ok(()),
            None => Err(HostError::TimerNotFound),
        }
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<DeviceEvent> {
        match lock(&self.event_rx).take() {
            Some(rx) => rx,
            None => {
                tracing::warn!("Mock device subscribed twice; returning a closed channel");
                let (_tx, rx) = mpsc::unbounded_channel();
                rx
            }
        }
    }
}

#[async_trait]
impl Vibrator for MockDevice {
    async fn vibrate(&self, duration: Duration) -> HostResult<()> {
        lock(&self.vibrations).push(VibrationCall::Pulse(duration));
        Ok(())
    }

    async fn stop(&self) -> HostResult<()> {
        lock(&self.vibrations).push(VibrationCall::Stop);
        Ok(())
    }
}

#[async_trait]
impl HttpTransport for MockDevice {
    async fn request(&self, request: HttpRequest) -> HostResult<HttpResponse> {
        lock(&self.requests).push(request);

        let gate = lock(&self.gate).clone();
        if let Some(gate) = gate {
            // Closing the semaphore releases every waiter
            let _ = gate.acquire().await;
        }

        match lock(&self.replies).pop_front() {
            Some(MockReply::Response(resp)) => Ok(resp),
            Some(MockReply::Failure(msg)) => Err(HostError::Transport(msg)),
            None => Ok(HttpResponse::ok("{\"success\":true}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizalarm_api::RepeatMask;
    use quizalarm_util::WallClock;

    fn spec(id: u32) -> TimerSpec {
        TimerSpec {
            alarm_id: AlarmId::new(id),
            clock: WallClock::new(8, 0).unwrap(),
            repeat: RepeatMask::WEEKDAYS,
        }
    }

    #[tokio::test]
    async fn mock_register_fire_and_cancel() {
        let device = MockDevice::new();
        let mut rx = device.subscribe();

        let handle = device.set_recurring_timer(spec(2)).await.unwrap();
        assert_eq!(device.live_timer_count(), 1);

        assert!(device.fire(AlarmId::new(2)));
        match rx.recv().await.unwrap() {
            DeviceEvent::AlarmFired { alarm_id, handle: fired } => {
                assert_eq!(alarm_id, AlarmId::new(2));
                assert_eq!(fired, handle);
            }
        }

        device.cancel_timer(&handle).await.unwrap();
        assert_eq!(device.live_timer_count(), 0);
        assert!(!device.fire(AlarmId::new(2)));
        assert!(matches!(
            device.cancel_timer(&handle).await,
            Err(HostError::TimerNotFound)
        ));
    }

    #[tokio::test]
    async fn mock_schedule_failure() {
        let device = MockDevice::new();
        device.set_fail_schedule(true);

        assert!(device.set_recurring_timer(spec(0)).await.is_err());
        assert_eq!(device.registration_count(), 0);
    }

    #[tokio::test]
    async fn mock_scripted_http() {
        let device = MockDevice::new();
        device.push_response(500, "boom");
        device.push_failure("connection refused");

        let req = HttpRequest::get("http://x/api/config", Duration::from_secs(1));
        assert_eq!(device.request(req.clone()).await.unwrap().status, 500);
        assert!(device.request(req.clone()).await.is_err());
        assert!(device.request(req).await.unwrap().is_ok());
        assert_eq!(device.request_count(), 3);
    }

    #[tokio::test]
    async fn mock_request_gate() {
        let device = Arc::new(MockDevice::new());
        device.hold_requests();

        let d = device.clone();
        let task = tokio::spawn(async move {
            d.request(HttpRequest::get("http://x/", Duration::from_secs(1)))
                .await
        });

        assert!(device.wait_for_requests(1, Duration::from_secs(1)).await);
        assert!(!task.is_finished());

        device.release_requests();
        assert!(task.await.unwrap().is_ok());
    }

    #[test]
    fn second_subscribe_is_closed() {
        let device = MockDevice::new();
        let _rx = device.subscribe();
        let mut second = device.subscribe();
        assert!(second.try_recv().is_err());
    }
}
