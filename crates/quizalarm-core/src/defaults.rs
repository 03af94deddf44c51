//! First-run initialization of the persisted keys

use quizalarm_api::{Alarm, DEFAULT_TND_RATE, HistoryEntry};
use quizalarm_config::ServiceConfig;
use quizalarm_store::{KeyValueStore, keys, save_if_absent};
use quizalarm_util::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::{AlarmRegistry, QuestionBank};

/// Initial values taken from the configuration file
#[derive(Debug, Clone, PartialEq)]
pub struct FirstRunSeed {
    pub server_url: String,
    pub sync_enabled: bool,
    pub time_limit: Duration,
    pub alarms: Vec<Alarm>,
}

impl FirstRunSeed {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            server_url: config.sync.server_url.clone(),
            sync_enabled: config.sync.enabled,
            time_limit: config.session.time_limit,
            alarms: config.alarm_seeds.clone(),
        }
    }
}

impl Default for FirstRunSeed {
    fn default() -> Self {
        Self::from_config(&ServiceConfig::default())
    }
}

/// Write every missing key. Existing values are left alone.
///
/// Returns the keys that were written.
pub fn initialize_defaults(
    store: Arc<dyn KeyValueStore>,
    seed: &FirstRunSeed,
) -> Result<Vec<&'static str>> {
    let mut written = Vec::new();
    let kv = store.as_ref();

    if save_if_absent(kv, keys::BALANCE, &0i64)? {
        written.push(keys::BALANCE);
    }
    if save_if_absent(kv, keys::HISTORY, &Vec::<HistoryEntry>::new())? {
        written.push(keys::HISTORY);
    }
    if QuestionBank::new(store.clone()).ensure_defaults()? {
        written.push(keys::QUESTIONS);
    }
    if AlarmRegistry::new(store.clone()).ensure_defaults(&seed.alarms)? {
        written.push(keys::ALARMS);
    }
    if save_if_absent(kv, keys::TND_RATE, &DEFAULT_TND_RATE)? {
        written.push(keys::TND_RATE);
    }
    if save_if_absent(kv, keys::SYNC_ENABLED, &seed.sync_enabled)? {
        written.push(keys::SYNC_ENABLED);
    }
    if save_if_absent(kv, keys::SERVER_URL, seed.server_url.trim())? {
        written.push(keys::SERVER_URL);
    }
    let duration_ms = u64::try_from(seed.time_limit.as_millis()).unwrap_or(u64::MAX);
    if save_if_absent(kv, keys::VIBRATION_DURATION, &duration_ms)? {
        written.push(keys::VIBRATION_DURATION);
    }

    if !written.is_empty() {
        info!(keys = ?written, "Initialized default values");
    }
    Ok(written)
}
