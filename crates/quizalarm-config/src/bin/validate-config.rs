//! Config validation CLI tool
//!
//! Validates a quizalarm configuration file and reports any errors.

use quizalarm_util::{default_config_path, format_duration};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a quizalarm configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config {}", default_path.display());
            eprintln!("  validate-config config.example.toml");
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match quizalarm_config::load_config(&config_path) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", quizalarm_config::CURRENT_CONFIG_VERSION);
            println!("  Data dir: {}", config.data_dir.display());

            let server = if config.sync.server_url.is_empty() {
                "(not set)"
            } else {
                config.sync.server_url.as_str()
            };
            println!(
                "  Sync: {} [{}]",
                server,
                if config.sync.enabled { "enabled" } else { "disabled" }
            );
            println!(
                "  Session: {} limit, {}ms pulse every {}ms",
                format_duration(config.session.time_limit),
                config.session.pulse.as_millis(),
                config.session.tick_interval.as_millis()
            );

            if !config.alarm_seeds.is_empty() {
                println!();
                println!("Alarm seeds:");
                for alarm in &config.alarm_seeds {
                    println!(
                        "  - #{} {} ({}) {} questions{}",
                        alarm.id,
                        alarm.time_label(),
                        alarm.repeat,
                        alarm.questions_to_answer,
                        if alarm.enabled { "" } else { " [off]" }
                    );
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                quizalarm_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                quizalarm_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                quizalarm_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                quizalarm_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        quizalarm_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
