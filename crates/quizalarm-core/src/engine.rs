//! Core service facade
//!
//! Builds every service over one store and one device, and routes device
//! firings into dismissal sessions.

use quizalarm_api::{Alarm, AlarmPatch, SessionView};
use quizalarm_config::ServiceConfig;
use quizalarm_host_api::{AlarmTimer, DeviceEvent, HttpTransport, Vibrator};
use quizalarm_store::KeyValueStore;
use quizalarm_util::{AlarmId, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    AlarmRegistry, AlarmScheduler, CoreEvent, DismissalService, EventReceiver, EventSender,
    FirstRunSeed, Ledger, QuestionBank, SyncManager, event_channel, initialize_defaults,
};

/// The device capabilities the core needs
#[derive(Clone)]
pub struct DeviceParts {
    pub timer: Arc<dyn AlarmTimer>,
    pub vibrator: Arc<dyn Vibrator>,
    pub transport: Arc<dyn HttpTransport>,
}

impl DeviceParts {
    /// Use one device for every capability
    pub fn from_device<D>(device: Arc<D>) -> Self
    where
        D: AlarmTimer + Vibrator + HttpTransport + 'static,
    {
        Self {
            timer: device.clone(),
            vibrator: device.clone(),
            transport: device,
        }
    }
}

/// Point-in-time summary for display
#[derive(Debug, Clone)]
pub struct CoreSnapshot {
    pub alarms: Vec<Alarm>,
    pub armed: usize,
    pub balance: i64,
    pub balance_value: String,
    pub session: Option<SessionView>,
    pub sync_enabled: bool,
    pub last_sync: Option<i64>,
}

pub struct QuizAlarmCore {
    config: ServiceConfig,
    registry: Arc<AlarmRegistry>,
    questions: Arc<QuestionBank>,
    ledger: Arc<Ledger>,
    scheduler: Arc<AlarmScheduler>,
    dismissal: DismissalService,
    sync: Arc<SyncManager>,
    events: EventSender,
}

impl QuizAlarmCore {
    /// Initialize missing keys and build the services.
    ///
    /// Returns the core and the receiving end of its event stream.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        device: DeviceParts,
        config: ServiceConfig,
    ) -> Result<(Self, EventReceiver)> {
        initialize_defaults(store.clone(), &FirstRunSeed::from_config(&config))?;

        let (events, rx) = event_channel();
        let caps = device.timer.capabilities().clone();
        if !caps.can_reach_network {
            info!("Device has no network access, sync disabled");
        }

        let registry = Arc::new(AlarmRegistry::new(store.clone()));
        let questions = Arc::new(QuestionBank::new(store.clone()));
        let ledger = Arc::new(Ledger::new(store.clone()));
        let scheduler = Arc::new(AlarmScheduler::new(device.timer, registry.clone()));
        let sync = Arc::new(
            SyncManager::new(store.clone(), device.transport, config.sync.clone())
                .with_network(caps.can_reach_network)
                .with_events(events.clone()),
        );
        let dismissal = DismissalService::new(
            registry.clone(),
            questions.clone(),
            ledger.clone(),
            device.vibrator,
            store,
            config.session,
            events.clone(),
        )
        .with_sync(sync.clone())
        .with_haptics(caps.can_vibrate);

        info!(alarms = registry.all().len(), "Core initialized");

        Ok((
            Self {
                config,
                registry,
                questions,
                ledger,
                scheduler,
                dismissal,
                sync,
                events,
            },
            rx,
        ))
    }

    /// Arm enabled alarms and, if configured, pull the remote config.
    /// Returns the number of alarms armed.
    pub async fn start(&self) -> usize {
        let armed = self.scheduler.initialize().await;

        if self.config.sync.fetch_on_startup && self.sync.is_enabled() {
            let sync = self.sync.clone();
            tokio::spawn(async move {
                if sync.fetch_server_config().await.is_none() {
                    debug!("Startup config fetch returned nothing");
                }
            });
        }

        armed
    }

    /// Route a device event. Returns the view of a newly started session.
    pub fn handle_device_event(&self, event: DeviceEvent) -> Option<SessionView> {
        match event {
            DeviceEvent::AlarmFired { alarm_id, handle } => {
                if !self.scheduler.resolve_fired(alarm_id, &handle) {
                    debug!(alarm_id = %alarm_id, "Stale alarm firing ignored");
                    return None;
                }
                match self.dismissal.begin(alarm_id) {
                    Ok(view) => Some(view),
                    Err(e) => {
                        warn!(alarm_id = %alarm_id, error = %e, "Alarm firing not handled");
                        None
                    }
                }
            }
        }
    }

    pub async fn toggle_alarm(&self, id: AlarmId) -> Result<bool> {
        let enabled = self.scheduler.toggle(id).await?;
        let _ = self.events.send(CoreEvent::AlarmToggled {
            alarm_id: id,
            enabled,
        });
        Ok(enabled)
    }

    pub async fn update_alarm(&self, id: AlarmId, patch: AlarmPatch) -> Result<Alarm> {
        self.scheduler.update(id, patch).await
    }

    pub fn snapshot(&self) -> CoreSnapshot {
        let balance = self.ledger.balance();
        CoreSnapshot {
            alarms: self.registry.all(),
            armed: self.scheduler.armed_count(),
            balance,
            balance_value: self.ledger.format_value(balance),
            session: self.dismissal.current(),
            sync_enabled: self.sync.is_enabled(),
            last_sync: self.sync.last_sync(),
        }
    }

    /// Close any session and release every device registration
    pub async fn shutdown(&self) {
        self.dismissal.shutdown().await;
        let cancelled = self.scheduler.cancel_all().await;
        info!(cancelled, "Core shut down");
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<AlarmRegistry> {
        &self.registry
    }

    pub fn questions(&self) -> &Arc<QuestionBank> {
        &self.questions
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    pub fn scheduler(&self) -> &Arc<AlarmScheduler> {
        &self.scheduler
    }

    pub fn dismissal(&self) -> &DismissalService {
        &self.dismissal
    }

    pub fn sync(&self) -> &Arc<SyncManager> {
        &self.sync
    }
}
