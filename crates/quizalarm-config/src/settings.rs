//! Validated service settings

use quizalarm_api::{Alarm, DEFAULT_VIBRATION_DURATION_MS, RepeatMask};
use quizalarm_util::AlarmId;
use std::path::PathBuf;
use std::time::Duration;

use crate::schema::{RawAlarm, RawConfig, RawSessionConfig, RawSyncConfig};
use crate::validation::{parse_days, parse_time};

/// Validated configuration for the quizalarm service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory holding the store
    pub data_dir: PathBuf,
    pub sync: SyncSettings,
    pub session: SessionSettings,
    /// Alarm definitions seeded at first run
    pub alarm_seeds: Vec<Alarm>,
}

impl ServiceConfig {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            data_dir: raw
                .service
                .data_dir
                .unwrap_or_else(quizalarm_util::default_data_dir),
            sync: SyncSettings::from_raw(raw.sync),
            session: SessionSettings::from_raw(raw.session),
            alarm_seeds: raw.alarms.iter().filter_map(alarm_from_raw).collect(),
        }
    }

    /// Path of the SQLite store inside the data directory
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("quizalarm.db")
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: quizalarm_util::default_data_dir(),
            sync: SyncSettings::default(),
            session: SessionSettings::default(),
            alarm_seeds: Vec::new(),
        }
    }
}

/// Backend synchronization settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Initial `server_url`; the stored value wins once written
    pub server_url: String,
    /// Initial `sync_enabled`
    pub enabled: bool,
    pub fetch_on_startup: bool,
    pub balance_timeout: Duration,
    pub full_timeout: Duration,
    pub config_timeout: Duration,
}

impl SyncSettings {
    fn from_raw(raw: RawSyncConfig) -> Self {
        let defaults = Self::default();
        Self {
            server_url: raw.server_url.unwrap_or(defaults.server_url),
            enabled: raw.enabled.unwrap_or(defaults.enabled),
            fetch_on_startup: raw.fetch_on_startup.unwrap_or(defaults.fetch_on_startup),
            balance_timeout: raw
                .balance_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.balance_timeout),
            full_timeout: raw
                .full_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.full_timeout),
            config_timeout: raw
                .config_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.config_timeout),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            enabled: false,
            fetch_on_startup: true,
            balance_timeout: Duration::from_secs(10),
            full_timeout: Duration::from_secs(15),
            config_timeout: Duration::from_secs(10),
        }
    }
}

/// Dismissal session timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Initial `vibration_duration`; the stored value wins once written
    pub time_limit: Duration,
    pub tick_interval: Duration,
    pub pulse: Duration,
    pub exit_delay: Duration,
}

impl SessionSettings {
    fn from_raw(raw: RawSessionConfig) -> Self {
        let defaults = Self::default();
        Self {
            time_limit: raw
                .time_limit_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.time_limit),
            tick_interval: raw
                .tick_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.tick_interval),
            pulse: raw
                .pulse_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.pulse),
            exit_delay: raw
                .exit_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.exit_delay),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_millis(DEFAULT_VIBRATION_DURATION_MS),
            tick_interval: Duration::from_millis(1000),
            pulse: Duration::from_millis(500),
            exit_delay: Duration::from_millis(2000),
        }
    }
}

fn alarm_from_raw(raw: &RawAlarm) -> Option<Alarm> {
    let (hour, minute) = parse_time(&raw.time).ok()?;
    let repeat = match &raw.days {
        Some(days) => parse_days(days).ok()?,
        None => RepeatMask::WEEKDAYS,
    };
    let mut alarm = Alarm::default_for(AlarmId::new(raw.id));
    alarm.hour = hour;
    alarm.minute = minute;
    alarm.repeat = repeat;
    alarm.enabled = raw.enabled;
    if let Some(questions) = raw.questions {
        alarm.questions_to_answer = questions;
    }
    Some(alarm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let session = SessionSettings::default();
        assert_eq!(session.time_limit, Duration::from_secs(300));
        assert_eq!(session.tick_interval, Duration::from_secs(1));
        assert_eq!(session.pulse, Duration::from_millis(500));
        assert_eq!(session.exit_delay, Duration::from_secs(2));

        let sync = SyncSettings::default();
        assert!(sync.server_url.is_empty());
        assert!(!sync.enabled);
        assert_eq!(sync.balance_timeout, Duration::from_secs(10));
        assert_eq!(sync.full_timeout, Duration::from_secs(15));
    }

    #[test]
    fn alarm_seed_conversion() {
        let raw = RawAlarm {
            id: 2,
            time: "06:45".into(),
            days: None,
            questions: Some(3),
            enabled: true,
        };
        let alarm = alarm_from_raw(&raw).unwrap();
        assert_eq!(alarm.id, AlarmId::new(2));
        assert_eq!((alarm.hour, alarm.minute), (6, 45));
        assert_eq!(alarm.questions_to_answer, 3);
        assert_eq!(alarm.repeat, RepeatMask::WEEKDAYS);
        assert!(alarm.enabled);
    }
}
