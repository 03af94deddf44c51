//! Backend synchronization
//!
//! At most one request is in flight at a time. A call made while another is
//! running, or while sync is disabled, returns immediately without touching
//! the network.

use quizalarm_api::{BalanceSyncRequest, FullSyncRequest, HistoryEntry, Question, RemoteConfig};
use quizalarm_config::{SyncSettings, is_valid_server_url};
use quizalarm_host_api::{HttpRequest, HttpResponse, HttpTransport};
use quizalarm_store::{KeyValueStore, keys, load_or_else, save_typed};
use quizalarm_util::{QuizAlarmError, Result};
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use crate::{CoreEvent, EventSender, SyncKind};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a fresh `device_<millis>_<6 base36 chars>` identifier
pub fn generate_device_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("device_{}_{}", quizalarm_util::now_millis(), suffix)
}

/// Holds the in-flight flag; clears it on drop
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct SyncManager {
    store: Arc<dyn KeyValueStore>,
    transport: Arc<dyn HttpTransport>,
    settings: SyncSettings,
    online: bool,
    in_flight: AtomicBool,
    events: Option<EventSender>,
}

impl SyncManager {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn HttpTransport>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            store,
            transport,
            settings,
            online: true,
            in_flight: AtomicBool::new(false),
            events: None,
        }
    }

    /// A device without network access never syncs
    pub fn with_network(mut self, reachable: bool) -> Self {
        self.online = reachable;
        self
    }

    /// Report finished calls as [`CoreEvent::SyncFinished`]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Stored server URL without a trailing `/`
    pub fn server_url(&self) -> String {
        let url: String = load_or_else(self.store.as_ref(), keys::SERVER_URL, String::new);
        url.trim().trim_end_matches('/').to_string()
    }

    pub fn is_enabled(&self) -> bool {
        let enabled: bool = load_or_else(self.store.as_ref(), keys::SYNC_ENABLED, || false);
        self.online && enabled && !self.server_url().is_empty()
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        save_typed(self.store.as_ref(), keys::SYNC_ENABLED, &enabled)?;
        info!(enabled, "Sync setting changed");
        Ok(())
    }

    pub fn set_server_url(&self, url: &str) -> Result<()> {
        let url = url.trim();
        if !is_valid_server_url(url) {
            return Err(QuizAlarmError::validation(format!(
                "server url must start with http:// or https://, got '{url}'"
            )));
        }
        save_typed(self.store.as_ref(), keys::SERVER_URL, url)?;
        info!(url, "Server URL changed");
        Ok(())
    }

    /// Persistent device identifier, created on first use
    pub fn device_id(&self) -> String {
        let stored: Option<String> = load_or_else(self.store.as_ref(), keys::DEVICE_ID, || None);
        if let Some(id) = stored.filter(|id| !id.is_empty()) {
            return id;
        }

        let id = generate_device_id();
        if let Err(e) = save_typed(self.store.as_ref(), keys::DEVICE_ID, &id) {
            warn!(error = %e, "Failed to persist device id");
        }
        info!(device_id = %id, "Device id created");
        id
    }

    /// Milliseconds since the epoch of the last acknowledged push
    pub fn last_sync(&self) -> Option<i64> {
        load_or_else(self.store.as_ref(), keys::LAST_SYNC, || None)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Push the current balance and the entry that produced it
    pub async fn sync_balance(&self, balance: i64, history: Option<HistoryEntry>) -> bool {
        let Some(_guard) = self.begin(SyncKind::Balance) else {
            return false;
        };

        let body = BalanceSyncRequest {
            balance,
            history,
            timestamp: quizalarm_util::now_millis(),
            device_id: self.device_id(),
        };
        let url = format!("{}/api/sync/balance", self.server_url());

        let ok = self
            .push(SyncKind::Balance, url, &body, self.settings.balance_timeout)
            .await;
        self.finish(SyncKind::Balance, ok);
        ok
    }

    /// Push the whole local history
    pub async fn sync_full_history(&self) -> bool {
        let Some(_guard) = self.begin(SyncKind::FullHistory) else {
            return false;
        };

        let body = FullSyncRequest {
            balance: load_or_else(self.store.as_ref(), keys::BALANCE, || 0),
            history: load_or_else(self.store.as_ref(), keys::HISTORY, Vec::new),
            timestamp: quizalarm_util::now_millis(),
            device_id: self.device_id(),
        };
        let url = format!("{}/api/sync/full", self.server_url());

        let ok = self
            .push(SyncKind::FullHistory, url, &body, self.settings.full_timeout)
            .await;
        self.finish(SyncKind::FullHistory, ok);
        ok
    }

    /// Pull the remote configuration and overwrite the local conversion rate
    /// and question list with whichever of them the server sent
    pub async fn fetch_server_config(&self) -> Option<RemoteConfig> {
        let _guard = self.begin(SyncKind::Config)?;

        let url = format!("{}/api/config", self.server_url());
        let request = HttpRequest::get(url, self.settings.config_timeout);
        let config = match self.transport.request(request).await {
            Ok(resp) if resp.is_ok() => parse_remote_config(&resp),
            Ok(resp) => {
                warn!(status = resp.status, "Config fetch rejected");
                None
            }
            Err(e) => {
                warn!(error = %e, "Config fetch failed");
                None
            }
        };

        let Some(config) = config else {
            self.finish(SyncKind::Config, false);
            return None;
        };

        if let Some(rate) = config.tnd_rate {
            if let Err(e) = save_typed(self.store.as_ref(), keys::TND_RATE, &rate) {
                warn!(error = %e, "Failed to store conversion rate");
            }
        }
        if let Some(questions) = &config.questions {
            self.store_questions(questions);
        }

        info!(
            tnd_rate = ?config.tnd_rate,
            questions = config.questions.as_ref().map(Vec::len),
            "Server config applied"
        );
        self.finish(SyncKind::Config, true);
        Some(config)
    }

    fn store_questions(&self, questions: &[Question]) {
        if let Err(e) = save_typed(self.store.as_ref(), keys::QUESTIONS, questions) {
            warn!(error = %e, "Failed to store questions");
        }
    }

    fn begin(&self, kind: SyncKind) -> Option<FlightGuard<'_>> {
        if !self.is_enabled() {
            debug!(?kind, "Sync disabled, skipping");
            return None;
        }
        let guard = FlightGuard::acquire(&self.in_flight);
        if guard.is_none() {
            debug!(?kind, "Sync already in flight, skipping");
        }
        guard
    }

    async fn push<T: serde::Serialize>(
        &self,
        kind: SyncKind,
        url: String,
        body: &T,
        timeout: std::time::Duration,
    ) -> bool {
        let request = match HttpRequest::post_json(url, body, timeout) {
            Ok(request) => request,
            Err(e) => {
                warn!(?kind, error = %e, "Failed to encode sync body");
                return false;
            }
        };

        match self.transport.request(request).await {
            Ok(resp) if resp.is_ok() => {
                let now = quizalarm_util::now_millis();
                if let Err(e) = save_typed(self.store.as_ref(), keys::LAST_SYNC, &now) {
                    warn!(error = %e, "Failed to store last sync time");
                }
                debug!(?kind, "Sync acknowledged");
                true
            }
            Ok(resp) => {
                warn!(?kind, status = resp.status, "Sync rejected");
                false
            }
            Err(e) => {
                warn!(?kind, error = %e, "Sync failed");
                false
            }
        }
    }

    fn finish(&self, kind: SyncKind, success: bool) {
        if let Some(events) = &self.events {
            let _ = events.send(CoreEvent::SyncFinished { kind, success });
        }
    }
}

/// A config carrying neither a rate nor questions counts as unreadable
fn parse_remote_config(resp: &HttpResponse) -> Option<RemoteConfig> {
    let config = resp
        .json::<serde_json::Value>()
        .and_then(RemoteConfig::from_response);
    match config {
        Ok(config) if config.is_empty() => {
            warn!("Config response has no usable tndRate or questions");
            None
        }
        Ok(config) => Some(config),
        Err(e) => {
            warn!(error = %e, "Config response unreadable");
            None
        }
    }
}
