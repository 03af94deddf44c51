//! Dismissal service
//!
//! Owns the single session slot and every side effect of a fired alarm:
//! the tick loop, vibration pulses, scoring through the ledger, balance
//! pushes, and the exit delay.

use quizalarm_api::{AnswerOutcome, HistoryEntry, SessionEndReason, SessionState, SessionView};
use quizalarm_config::SessionSettings;
use quizalarm_host_api::Vibrator;
use quizalarm_store::{KeyValueStore, keys, load_or_else, save_typed};
use quizalarm_util::{AlarmId, MonotonicInstant, QuizAlarmError, Result, SessionId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::{
    ActivityHandle, AlarmRegistry, CoreEvent, DismissalSession, EventSender, Ledger, QuestionBank,
    SyncManager, TickOutcome, select_questions,
};

struct SessionSlot {
    session: DismissalSession,
    ticker: ActivityHandle,
    exit: ActivityHandle,
}

/// Everything needed to finish a session once the slot lock is released
struct SessionEnd {
    session_id: SessionId,
    alarm_id: AlarmId,
    reason: SessionEndReason,
    points_delta: i64,
    ticker: ActivityHandle,
}

impl SessionEnd {
    fn take(slot: &mut SessionSlot, reason: SessionEndReason) -> Self {
        Self {
            session_id: slot.session.session_id,
            alarm_id: slot.session.alarm_id,
            reason,
            points_delta: slot.session.points_delta(),
            ticker: std::mem::take(&mut slot.ticker),
        }
    }
}

struct Inner {
    registry: Arc<AlarmRegistry>,
    questions: Arc<QuestionBank>,
    ledger: Arc<Ledger>,
    sync: Option<Arc<SyncManager>>,
    vibrator: Arc<dyn Vibrator>,
    haptics: bool,
    /// Held around every pulse and stop so a pulse can't land after teardown
    motor: tokio::sync::Mutex<()>,
    store: Arc<dyn KeyValueStore>,
    settings: SessionSettings,
    events: EventSender,
    slot: Mutex<Option<SessionSlot>>,
    rng: Mutex<StdRng>,
}

impl Inner {
    fn slot(&self) -> MutexGuard<'_, Option<SessionSlot>> {
        self.slot.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn emit(&self, event: CoreEvent) {
        let _ = self.events.send(event);
    }
}

/// Runs at most one dismissal session at a time
#[derive(Clone)]
pub struct DismissalService {
    inner: Arc<Inner>,
}

impl DismissalService {
    pub fn new(
        registry: Arc<AlarmRegistry>,
        questions: Arc<QuestionBank>,
        ledger: Arc<Ledger>,
        vibrator: Arc<dyn Vibrator>,
        store: Arc<dyn KeyValueStore>,
        settings: SessionSettings,
        events: EventSender,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                questions,
                ledger,
                sync: None,
                vibrator,
                haptics: true,
                motor: tokio::sync::Mutex::new(()),
                store,
                settings,
                events,
                slot: Mutex::new(None),
                rng: Mutex::new(StdRng::from_entropy()),
            }),
        }
    }

    fn inner_mut(&mut self) -> Option<&mut Inner> {
        Arc::get_mut(&mut self.inner)
    }

    /// Push the balance after every scored answer
    pub fn with_sync(mut self, sync: Arc<SyncManager>) -> Self {
        if let Some(inner) = self.inner_mut() {
            inner.sync = Some(sync);
        }
        self
    }

    /// Devices without a motor run sessions silently
    pub fn with_haptics(mut self, enabled: bool) -> Self {
        if let Some(inner) = self.inner_mut() {
            inner.haptics = enabled;
        }
        self
    }

    /// Deterministic question selection
    pub fn with_seed(mut self, seed: u64) -> Self {
        if let Some(inner) = self.inner_mut() {
            inner.rng = Mutex::new(StdRng::seed_from_u64(seed));
        }
        self
    }

    /// Session time limit: stored `vibration_duration`, else the configured one
    pub fn time_limit(&self) -> Duration {
        let stored: Option<u64> =
            load_or_else(self.inner.store.as_ref(), keys::VIBRATION_DURATION, || None);
        match stored {
            Some(ms) if ms > 0 => Duration::from_millis(ms),
            _ => self.inner.settings.time_limit,
        }
    }

    pub fn set_time_limit(&self, limit: Duration) -> Result<()> {
        if limit.is_zero() {
            return Err(QuizAlarmError::validation("time limit must be positive"));
        }
        let ms = u64::try_from(limit.as_millis())
            .map_err(|_| QuizAlarmError::validation("time limit too large"))?;
        save_typed(self.inner.store.as_ref(), keys::VIBRATION_DURATION, &ms)?;
        info!(ms, "Session time limit changed");
        Ok(())
    }

    /// Start a session for a fired alarm
    ///
    /// Rejected while another session is active. A session still in its exit
    /// delay is replaced.
    pub fn begin(&self, alarm_id: AlarmId) -> Result<SessionView> {
        let inner = &self.inner;
        let mut slot = inner.slot();

        if let Some(current) = slot.as_ref() {
            if current.session.is_active() {
                let active = current.session.alarm_id;
                warn!(alarm_id = %alarm_id, active = %active, "Alarm fired during an active session, ignoring");
                inner.emit(CoreEvent::TriggerRejected { alarm_id, active });
                return Err(QuizAlarmError::SessionAlreadyActive(active));
            }
        }

        let alarm = inner
            .registry
            .find(alarm_id)
            .ok_or(QuizAlarmError::AlarmNotFound(alarm_id))?;

        let pool = inner.questions.pool();
        let selected = {
            let mut rng = inner.rng.lock().unwrap_or_else(|p| p.into_inner());
            select_questions(&pool, alarm.questions_to_answer as usize, &mut *rng)
        };

        let now = quizalarm_util::now();
        let now_mono = MonotonicInstant::now();
        let mut session =
            DismissalSession::new(alarm_id, selected, self.time_limit(), now, now_mono);
        session.start();

        if let Some(previous) = slot.take() {
            inner.emit(CoreEvent::LeaveSession {
                session_id: previous.session.session_id,
            });
        }

        let session_id = session.session_id;
        let view = session.view(now_mono);
        inner.emit(CoreEvent::SessionStarted {
            session_id,
            alarm_id,
            total_questions: session.total_questions(),
            deadline: session.deadline,
        });

        let ticker = if session.is_active() {
            ActivityHandle::spawn(tick_loop(
                Arc::downgrade(inner),
                inner.settings.tick_interval,
            ))
        } else {
            ActivityHandle::idle()
        };

        let mut new_slot = SessionSlot {
            session,
            ticker,
            exit: ActivityHandle::idle(),
        };

        info!(
            session_id = %session_id,
            alarm_id = %alarm_id,
            questions = view.total_questions,
            deadline = %quizalarm_util::format_clock_time(&new_slot.session.deadline),
            "Dismissal session started"
        );

        // Nothing to answer; dismiss without waiting for input
        if !new_slot.session.is_active() {
            let end = SessionEnd::take(&mut new_slot, SessionEndReason::Dismissed);
            *slot = Some(new_slot);
            drop(slot);
            self.finish_detached(end);
            return Ok(view);
        }

        *slot = Some(new_slot);
        Ok(view)
    }

    /// Score the current question
    pub async fn answer(&self, is_yes: bool) -> AnswerOutcome {
        let inner = &self.inner;
        let now_mono = MonotonicInstant::now();

        let (outcome, scored, end) = {
            let mut slot = inner.slot();
            let Some(current) = slot.as_mut() else {
                return AnswerOutcome::Ignored;
            };

            let was_active = current.session.is_active();
            let question = current.session.current_question().cloned();
            let outcome = current.session.answer(is_yes, now_mono);

            let scored = match (outcome.points(), question) {
                (Some(points), Some(question)) => {
                    match inner.ledger.record_answer(&question, is_yes) {
                        Ok((balance, entry)) => {
                            inner.emit(CoreEvent::AnswerScored {
                                session_id: current.session.session_id,
                                question_id: question.id,
                                points,
                                balance,
                                answered: current.session.answered_count(),
                                total: current.session.total_questions(),
                            });
                            Some((balance, entry))
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to record answer");
                            None
                        }
                    }
                }
                _ => None,
            };

            let end = match current.session.state() {
                SessionState::Dismissed if was_active => {
                    Some(SessionEnd::take(current, SessionEndReason::Dismissed))
                }
                SessionState::Expired if was_active => {
                    Some(SessionEnd::take(current, SessionEndReason::Expired))
                }
                _ => None,
            };

            (outcome, scored, end)
        };

        if let Some((balance, entry)) = scored {
            debug!(points = entry.points, balance, "Answer scored");
            self.push_balance(balance, entry);
        }

        if let Some(end) = end {
            finish_session(inner, end).await;
        }

        outcome
    }

    /// One step of the countdown. Called by the tick loop.
    pub async fn tick(&self, now_mono: MonotonicInstant) -> TickOutcome {
        tick_once(&self.inner, now_mono).await
    }

    /// The user left the session view
    pub async fn abandon(&self) -> Result<()> {
        let end = {
            let mut slot = self.inner.slot();
            let Some(current) = slot.as_mut() else {
                return Err(QuizAlarmError::NoActiveSession);
            };
            if !current.session.abandon() {
                // Already finished; just close it
                let session_id = current.session.session_id;
                *slot = None;
                self.inner.emit(CoreEvent::LeaveSession { session_id });
                return Ok(());
            }
            let end = SessionEnd::take(current, SessionEndReason::Abandoned);
            *slot = None;
            end
        };

        finish_session(&self.inner, end).await;
        Ok(())
    }

    pub fn current(&self) -> Option<SessionView> {
        let now_mono = MonotonicInstant::now();
        self.inner
            .slot()
            .as_ref()
            .map(|current| current.session.view(now_mono))
    }

    pub fn is_active(&self) -> bool {
        self.inner
            .slot()
            .as_ref()
            .is_some_and(|current| current.session.is_active())
    }

    /// Abandon any running session and stop the motor
    pub async fn shutdown(&self) {
        if self.abandon().await.is_err() {
            debug!("No session to close at shutdown");
        }
    }

    fn push_balance(&self, balance: i64, entry: HistoryEntry) {
        let Some(sync) = self.inner.sync.clone() else {
            return;
        };
        // Not awaited; teardown never cancels it
        tokio::spawn(async move {
            sync.sync_balance(balance, Some(entry)).await;
        });
    }

    fn finish_detached(&self, end: SessionEnd) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            finish_session(&inner, end).await;
        });
    }
}

async fn tick_loop(inner: Weak<Inner>, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;
        let Some(inner) = inner.upgrade() else {
            break;
        };
        match tick_once(&inner, MonotonicInstant::now()).await {
            TickOutcome::Idle | TickOutcome::Expired => break,
            TickOutcome::Waiting | TickOutcome::Pulse => {}
        }
    }
}

async fn tick_once(inner: &Arc<Inner>, now_mono: MonotonicInstant) -> TickOutcome {
    let (outcome, session_id, end) = {
        let mut slot = inner.slot();
        match slot.as_mut() {
            None => (TickOutcome::Idle, None, None),
            Some(current) => {
                let outcome = current.session.tick(now_mono);
                let end = (outcome == TickOutcome::Expired)
                    .then(|| SessionEnd::take(current, SessionEndReason::Expired));
                (outcome, Some(current.session.session_id), end)
            }
        }
    };

    match outcome {
        TickOutcome::Pulse => {
            if let (true, Some(session_id)) = (inner.haptics, session_id) {
                pulse(inner, session_id).await;
            }
        }
        TickOutcome::Expired => {
            if let Some(end) = end {
                finish_session(inner, end).await;
            }
        }
        TickOutcome::Idle | TickOutcome::Waiting => {}
    }

    outcome
}

/// Pulse unless the session stopped vibrating while waiting for the motor
async fn pulse(inner: &Inner, session_id: SessionId) {
    let _motor = inner.motor.lock().await;
    let vibrating = inner.slot().as_ref().is_some_and(|current| {
        current.session.session_id == session_id && current.session.is_vibrating()
    });
    if !vibrating {
        debug!(session_id = %session_id, "Session ended before pulse");
        return;
    }

    if let Err(e) = inner.vibrator.vibrate(inner.settings.pulse).await {
        warn!(error = %e, "Vibration pulse failed");
    }
}

/// Stop the motor, report the end, and start the exit delay.
///
/// The ticker is dropped last: when this runs on the tick task itself,
/// dropping it aborts the caller.
async fn finish_session(inner: &Arc<Inner>, end: SessionEnd) {
    let SessionEnd {
        session_id,
        alarm_id,
        reason,
        points_delta,
        ticker,
    } = end;

    if inner.haptics {
        let _motor = inner.motor.lock().await;
        if let Err(e) = inner.vibrator.stop().await {
            warn!(error = %e, "Failed to stop vibration");
        }
    }

    match reason {
        SessionEndReason::Dismissed => {
            info!(session_id = %session_id, alarm_id = %alarm_id, points_delta, "Alarm dismissed");
            inner.emit(CoreEvent::SessionDismissed {
                session_id,
                alarm_id,
                points_delta,
            });
        }
        SessionEndReason::Expired => {
            info!(session_id = %session_id, alarm_id = %alarm_id, "Time expired");
            inner.emit(CoreEvent::SessionExpired {
                session_id,
                alarm_id,
            });
        }
        SessionEndReason::Abandoned => {
            info!(session_id = %session_id, alarm_id = %alarm_id, "Session abandoned");
        }
    }

    inner.emit(CoreEvent::SessionEnded {
        session_id,
        alarm_id,
        reason,
    });

    if reason != SessionEndReason::Abandoned {
        let exit = ActivityHandle::spawn(exit_after(
            Arc::downgrade(inner),
            session_id,
            inner.settings.exit_delay,
        ));
        let mut slot = inner.slot();
        match slot.as_mut() {
            Some(current) if current.session.session_id == session_id => current.exit = exit,
            _ => drop(exit),
        }
    }

    drop(ticker);
}

async fn exit_after(inner: Weak<Inner>, session_id: SessionId, delay: Duration) {
    tokio::time::sleep(delay).await;
    let Some(inner) = inner.upgrade() else {
        return;
    };

    let finished = {
        let mut slot = inner.slot();
        match slot.as_ref() {
            Some(current) if current.session.session_id == session_id => slot.take(),
            _ => None,
        }
    };

    if let Some(mut finished) = finished {
        inner.emit(CoreEvent::LeaveSession { session_id });
        debug!(session_id = %session_id, "Session closed");
        // Dropping the slot must not abort this task
        finished.exit.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_channel;
    use quizalarm_config::SyncSettings;
    use quizalarm_host_api::{MockDevice, VibrationCall};
    use quizalarm_store::SqliteStore;

    struct Harness {
        device: Arc<MockDevice>,
        ledger: Arc<Ledger>,
        registry: Arc<AlarmRegistry>,
        service: DismissalService,
        events: crate::EventReceiver,
    }

    fn fast_settings() -> SessionSettings {
        SessionSettings {
            time_limit: Duration::from_secs(300),
            tick_interval: Duration::from_millis(20),
            pulse: Duration::from_millis(10),
            exit_delay: Duration::from_millis(30),
        }
    }

    fn harness(settings: SessionSettings) -> Harness {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let registry = Arc::new(AlarmRegistry::new(store.clone()));
        registry.ensure_defaults(&[]).unwrap();
        let questions = Arc::new(QuestionBank::new(store.clone()));
        let ledger = Arc::new(Ledger::new(store.clone()));
        let device = Arc::new(MockDevice::new());
        let (tx, rx) = event_channel();

        let sync = Arc::new(SyncManager::new(
            store.clone(),
            device.clone(),
            SyncSettings::default(),
        ));

        let service = DismissalService::new(
            registry.clone(),
            questions,
            ledger.clone(),
            device.clone(),
            store,
            settings,
            tx,
        )
        .with_sync(sync)
        .with_seed(9);

        Harness {
            device,
            ledger,
            registry,
            service,
            events: rx,
        }
    }

    fn drain(rx: &mut crate::EventReceiver) -> Vec<CoreEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn set_quota(registry: &AlarmRegistry, id: u32, n: u32) {
        let mut alarm = registry.find(AlarmId::new(id)).unwrap();
        alarm.questions_to_answer = n;
        registry.upsert(alarm).unwrap();
    }

    #[tokio::test]
    async fn answers_dismiss_and_score() {
        let mut h = harness(fast_settings());
        set_quota(&h.registry, 0, 2);
        h.ledger.apply(100, "Starting points").unwrap();

        let view = h.service.begin(AlarmId::new(0)).unwrap();
        assert_eq!(view.state, SessionState::Active);
        assert_eq!(view.total_questions, 2);

        assert!(matches!(
            h.service.answer(true).await,
            AnswerOutcome::Scored { answered: 1, total: 2, .. }
        ));
        assert!(matches!(
            h.service.answer(false).await,
            AnswerOutcome::Completed { points_delta: 5, .. }
        ));
        assert_eq!(h.ledger.balance(), 105);
        assert!(!h.service.is_active());
        assert_eq!(h.service.answer(true).await, AnswerOutcome::Ignored);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(h.service.current().is_none());

        let events = drain(&mut h.events);
        assert!(events.iter().any(|e| matches!(e, CoreEvent::SessionDismissed { points_delta: 5, .. })));
        assert!(events.iter().any(|e| matches!(e, CoreEvent::LeaveSession { .. })));
        assert_eq!(
            events.iter().filter(|e| matches!(e, CoreEvent::AnswerScored { .. })).count(),
            2
        );
        assert_eq!(h.device.vibrations().last(), Some(&VibrationCall::Stop));
    }

    #[tokio::test]
    async fn second_trigger_is_rejected() {
        let mut h = harness(fast_settings());
        h.service.begin(AlarmId::new(0)).unwrap();

        let err = h.service.begin(AlarmId::new(1)).unwrap_err();
        assert!(matches!(err, QuizAlarmError::SessionAlreadyActive(id) if id == AlarmId::new(0)));
        assert_eq!(h.service.current().unwrap().alarm_id, AlarmId::new(0));

        let events = drain(&mut h.events);
        assert!(events.iter().any(|e| matches!(e, CoreEvent::TriggerRejected { .. })));
    }

    #[tokio::test]
    async fn unknown_alarm() {
        let h = harness(fast_settings());
        let err = h.service.begin(AlarmId::new(77)).unwrap_err();
        assert!(matches!(err, QuizAlarmError::AlarmNotFound(_)));
        assert!(h.service.current().is_none());
    }

    #[tokio::test]
    async fn ticks_pulse_then_expire() {
        let mut settings = fast_settings();
        settings.time_limit = Duration::from_millis(120);
        let mut h = harness(settings);

        h.service.begin(AlarmId::new(0)).unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;

        assert!(h.device.pulse_count() >= 2);
        let events = drain(&mut h.events);
        assert!(events.iter().any(|e| matches!(e, CoreEvent::SessionExpired { .. })));
        assert!(events.iter().any(|e| matches!(
            e,
            CoreEvent::SessionEnded { reason: SessionEndReason::Expired, .. }
        )));

        // Late answer after expiry changes nothing
        let before = h.ledger.balance();
        assert_eq!(h.service.answer(true).await, AnswerOutcome::Ignored);
        assert_eq!(h.ledger.balance(), before);

        let pulses = h.device.pulse_count();
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(h.device.pulse_count(), pulses);
    }

    #[tokio::test]
    async fn stored_time_limit_wins() {
        let h = harness(fast_settings());
        assert_eq!(h.service.time_limit(), Duration::from_secs(300));

        h.service.set_time_limit(Duration::from_secs(60)).unwrap();
        assert_eq!(h.service.time_limit(), Duration::from_secs(60));
        assert!(h.service.set_time_limit(Duration::ZERO).is_err());
    }

    #[tokio::test]
    async fn abandon_clears_slot() {
        let mut h = harness(fast_settings());
        h.service.begin(AlarmId::new(0)).unwrap();
        h.service.abandon().await.unwrap();

        assert!(h.service.current().is_none());
        assert!(matches!(
            h.service.abandon().await,
            Err(QuizAlarmError::NoActiveSession)
        ));

        let events = drain(&mut h.events);
        assert!(events.iter().any(|e| matches!(
            e,
            CoreEvent::SessionEnded { reason: SessionEndReason::Abandoned, .. }
        )));

        // A new alarm may start right away
        h.service.begin(AlarmId::new(1)).unwrap();
    }

    /// Records motor calls; pulses wait for `gate`
    struct GatedMotor {
        calls: Mutex<Vec<&'static str>>,
        gate: tokio::sync::Semaphore,
    }

    #[async_trait::async_trait]
    impl Vibrator for GatedMotor {
        async fn vibrate(&self, _duration: Duration) -> quizalarm_host_api::HostResult<()> {
            self.calls.lock().unwrap().push("vibrate");
            self.gate.acquire().await.unwrap().forget();
            Ok(())
        }

        async fn stop(&self) -> quizalarm_host_api::HostResult<()> {
            self.calls.lock().unwrap().push("stop");
            Ok(())
        }
    }

    #[tokio::test]
    async fn pending_pulse_never_follows_stop() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let registry = Arc::new(AlarmRegistry::new(store.clone()));
        registry.ensure_defaults(&[]).unwrap();
        let motor = Arc::new(GatedMotor {
            calls: Mutex::new(Vec::new()),
            gate: tokio::sync::Semaphore::new(0),
        });
        let (tx, _rx) = event_channel();
        let mut settings = fast_settings();
        settings.tick_interval = Duration::from_secs(3600);

        let service = DismissalService::new(
            registry,
            Arc::new(QuestionBank::new(store.clone())),
            Arc::new(Ledger::new(store.clone())),
            motor.clone(),
            store,
            settings,
            tx,
        );
        service.begin(AlarmId::new(0)).unwrap();

        // First pulse holds the motor; the second is queued behind it
        let first = {
            let service = service.clone();
            tokio::spawn(async move { service.tick(MonotonicInstant::now()).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = {
            let service = service.clone();
            tokio::spawn(async move { service.tick(MonotonicInstant::now()).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let abandon = {
            let service = service.clone();
            tokio::spawn(async move { service.abandon().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        motor.gate.add_permits(4);
        assert_eq!(first.await.unwrap(), TickOutcome::Pulse);
        assert_eq!(second.await.unwrap(), TickOutcome::Pulse);
        abandon.await.unwrap().unwrap();

        assert_eq!(*motor.calls.lock().unwrap(), vec!["vibrate", "stop"]);
    }

    #[tokio::test]
    async fn no_motor_means_no_pulses() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let registry = Arc::new(AlarmRegistry::new(store.clone()));
        registry.ensure_defaults(&[]).unwrap();
        let device = Arc::new(MockDevice::new());
        let (tx, _rx) = event_channel();

        let service = DismissalService::new(
            registry,
            Arc::new(QuestionBank::new(store.clone())),
            Arc::new(Ledger::new(store.clone())),
            device.clone(),
            store,
            fast_settings(),
            tx,
        )
        .with_haptics(false);

        service.begin(AlarmId::new(0)).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(service.is_active());
        service.abandon().await.unwrap();

        assert_eq!(device.pulse_count(), 0);
        assert!(device.vibrations().is_empty());
    }

    #[tokio::test]
    async fn answer_without_session() {
        let h = harness(fast_settings());
        assert_eq!(h.service.answer(true).await, AnswerOutcome::Ignored);
        assert_eq!(h.ledger.balance(), 0);
    }
}
