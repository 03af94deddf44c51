//! Configuration validation

use quizalarm_api::{DEFAULT_ALARM_COUNT, QUESTION_POOL_SIZE, RepeatMask};
use std::collections::HashSet;
use thiserror::Error;

use crate::schema::{RawAlarm, RawConfig, RawDays};
use crate::settings::SessionSettings;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Invalid server URL '{0}': must start with http:// or https://")]
    InvalidServerUrl(String),

    #[error("Alarm {alarm_id}: {message}")]
    AlarmError { alarm_id: u32, message: String },

    #[error("Duplicate alarm ID: {0}")]
    DuplicateAlarmId(u32),
}

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
}

/// Validate a raw configuration, reporting every problem found
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_sync(config));
    errors.extend(validate_session(config));

    let mut seen_ids = HashSet::new();
    for alarm in &config.alarms {
        if !seen_ids.insert(alarm.id) {
            errors.push(ValidationError::DuplicateAlarmId(alarm.id));
        }
        errors.extend(validate_alarm(alarm));
    }

    errors
}

fn validate_sync(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let sync = &config.sync;

    if let Some(url) = &sync.server_url {
        if !is_valid_server_url(url) {
            errors.push(ValidationError::InvalidServerUrl(url.clone()));
        }
    }

    for (field, value) in [
        ("sync.balance_timeout_secs", sync.balance_timeout_secs),
        ("sync.full_timeout_secs", sync.full_timeout_secs),
        ("sync.config_timeout_secs", sync.config_timeout_secs),
    ] {
        if value == Some(0) {
            errors.push(invalid(field, "must be greater than zero"));
        }
    }

    errors
}

fn validate_session(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let session = &config.session;
    let defaults = SessionSettings::default();

    if session.time_limit_secs == Some(0) {
        errors.push(invalid("session.time_limit_secs", "must be greater than zero"));
    }
    if session.tick_interval_ms == Some(0) {
        errors.push(invalid("session.tick_interval_ms", "must be greater than zero"));
    }

    let tick = session
        .tick_interval_ms
        .unwrap_or(defaults.tick_interval.as_millis() as u64);
    let pulse = session.pulse_ms.unwrap_or(defaults.pulse.as_millis() as u64);
    if tick > 0 && pulse >= tick {
        errors.push(invalid(
            "session.pulse_ms",
            format!("pulse ({pulse}ms) must be shorter than the tick interval ({tick}ms)"),
        ));
    }

    errors
}

fn validate_alarm(alarm: &RawAlarm) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let alarm_error = |message: String| ValidationError::AlarmError {
        alarm_id: alarm.id,
        message,
    };

    if alarm.id >= DEFAULT_ALARM_COUNT {
        errors.push(alarm_error(format!(
            "id must be below {}",
            DEFAULT_ALARM_COUNT
        )));
    }

    if let Err(e) = parse_time(&alarm.time) {
        errors.push(alarm_error(format!("time '{}': {}", alarm.time, e)));
    }

    if let Some(days) = &alarm.days {
        if let Err(e) = parse_days(days) {
            errors.push(alarm_error(e));
        }
    }

    if let Some(questions) = alarm.questions {
        if questions == 0 || questions as usize > QUESTION_POOL_SIZE {
            errors.push(alarm_error(format!(
                "questions must be between 1 and {}",
                QUESTION_POOL_SIZE
            )));
        }
    }

    errors
}

/// Empty (sync unconfigured) or an http(s) URL
pub fn is_valid_server_url(url: &str) -> bool {
    url.is_empty() || url.starts_with("http://") || url.starts_with("https://")
}

/// Parse HH:MM time format
pub fn parse_time(s: &str) -> Result<(u8, u8), String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err("Expected HH:MM format".into());
    }

    let hour: u8 = parts[0].trim().parse().map_err(|_| "Invalid hour".to_string())?;
    let minute: u8 = parts[1]
        .trim()
        .parse()
        .map_err(|_| "Invalid minute".to_string())?;

    if hour >= 24 {
        return Err("Hour must be 0-23".into());
    }
    if minute >= 60 {
        return Err("Minute must be 0-59".into());
    }

    Ok((hour, minute))
}

/// Parse days specification into a repeat mask (slot 0 = Monday)
pub fn parse_days(days: &RawDays) -> Result<RepeatMask, String> {
    match days {
        RawDays::Preset(preset) => match preset.to_lowercase().as_str() {
            "all" | "every" | "daily" => Ok(RepeatMask::EVERY_DAY),
            "weekdays" => Ok(RepeatMask::WEEKDAYS),
            "weekends" => Ok(RepeatMask::new([false, false, false, false, false, true, true])),
            other => Err(format!("Unknown day preset: {}", other)),
        },
        RawDays::List(list) => {
            let mut slots = [false; 7];
            for day in list {
                let slot = match day.to_lowercase().as_str() {
                    "mon" | "monday" => 0,
                    "tue" | "tuesday" => 1,
                    "wed" | "wednesday" => 2,
                    "thu" | "thursday" => 3,
                    "fri" | "friday" => 4,
                    "sat" | "saturday" => 5,
                    "sun" | "sunday" => 6,
                    other => return Err(format!("Unknown day: {}", other)),
                };
                slots[slot] = true;
            }
            Ok(RepeatMask::new(slots))
        }
    }
}
