//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Service-level settings
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Backend synchronization
    #[serde(default)]
    pub sync: RawSyncConfig,

    /// Dismissal session timing
    #[serde(default)]
    pub session: RawSessionConfig,

    /// Alarm definitions written at first run, overriding the defaults
    #[serde(default)]
    pub alarms: Vec<RawAlarm>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// Data directory for the store
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSyncConfig {
    /// Backend base URL; seeds the stored `server_url` at first run
    pub server_url: Option<String>,

    /// Seeds the stored `sync_enabled` at first run
    pub enabled: Option<bool>,

    /// Pull remote configuration when the service starts
    pub fetch_on_startup: Option<bool>,

    pub balance_timeout_secs: Option<u64>,
    pub full_timeout_secs: Option<u64>,
    pub config_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSessionConfig {
    /// Seconds the user has to answer before the session expires
    pub time_limit_secs: Option<u64>,

    /// Countdown tick period
    pub tick_interval_ms: Option<u64>,

    /// Vibration pulse length per tick
    pub pulse_ms: Option<u64>,

    /// Pause before leaving a finished session
    pub exit_delay_ms: Option<u64>,
}

/// Raw alarm seed
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawAlarm {
    /// Alarm slot (0-9)
    pub id: u32,

    /// Time of day (HH:MM format)
    pub time: String,

    /// Days the alarm rings on; defaults to weekdays
    #[serde(default)]
    pub days: Option<RawDays>,

    /// Questions to answer before dismissal
    pub questions: Option<u32>,

    #[serde(default)]
    pub enabled: bool,
}

/// Days specification
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawDays {
    /// Preset: "weekdays", "weekends", "daily"
    Preset(String),
    /// List of day names
    List(Vec<String>),
}
