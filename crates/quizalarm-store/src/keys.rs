//! Names of persisted keys

pub const BALANCE: &str = "balance";
pub const HISTORY: &str = "history";
pub const QUESTIONS: &str = "questions";
pub const ALARMS: &str = "alarms";
pub const TND_RATE: &str = "tnd_rate";
pub const SYNC_ENABLED: &str = "sync_enabled";
pub const SERVER_URL: &str = "server_url";
pub const DEVICE_ID: &str = "device_id";
pub const LAST_SYNC: &str = "last_sync";
pub const VIBRATION_DURATION: &str = "vibration_duration";

/// Every key written by the service
pub const ALL: [&str; 10] = [
    BALANCE,
    HISTORY,
    QUESTIONS,
    ALARMS,
    TND_RATE,
    SYNC_ENABLED,
    SERVER_URL,
    DEVICE_ID,
    LAST_SYNC,
    VIBRATION_DURATION,
];
