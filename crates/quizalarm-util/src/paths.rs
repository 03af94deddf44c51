//! Default paths for quizalarm components
//!
//! Paths are user-writable by default (no root required):
//! - Config: `$XDG_CONFIG_HOME/quizalarm/config.toml` or `~/.config/quizalarm/config.toml`
//! - Data: `$XDG_DATA_HOME/quizalarm` or `~/.local/share/quizalarm`

use std::path::PathBuf;

/// Environment variable for overriding the config file path
pub const QUIZALARM_CONFIG_ENV: &str = "QUIZALARM_CONFIG";

/// Environment variable for overriding the data directory
pub const QUIZALARM_DATA_DIR_ENV: &str = "QUIZALARM_DATA_DIR";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Application subdirectory name
const APP_DIR: &str = "quizalarm";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$QUIZALARM_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/quizalarm/config.toml` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/quizalarm/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(QUIZALARM_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILENAME)
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$QUIZALARM_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/quizalarm` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/quizalarm` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(QUIZALARM_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking QUIZALARM_DATA_DIR env var.
/// Used for default values in configs where the env var is checked separately.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_contains_app_name() {
        let path = data_dir_without_env();
        assert!(path.to_string_lossy().contains("quizalarm"));
    }

    #[test]
    fn config_path_is_toml() {
        let path = default_config_path();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("toml"));
    }
}
