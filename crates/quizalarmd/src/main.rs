//! quizalarmd - The quizalarm service
//!
//! This is the main entry point for the quizalarm service.
//! It wires together all the components:
//! - Configuration loading
//! - Store initialization
//! - Core services
//! - Desktop device (timers, vibration, HTTP)
//! - Text console on stdin

mod console;

use anyhow::{Context, Result};
use clap::Parser;
use console::{ConsoleCommand, HELP, parse_command};
use quizalarm_api::{AnswerOutcome, SessionView};
use quizalarm_config::load_config_or_default;
use quizalarm_core::{CoreEvent, DeviceParts, EventReceiver, QuizAlarmCore, SyncKind};
use quizalarm_host_api::AlarmTimer;
use quizalarm_host_desktop::DesktopDevice;
use quizalarm_store::{KeyValueStore, SqliteStore};
use quizalarm_util::{default_config_path, format_duration};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// quizalarmd - Alarms dismissed by answering productivity questions
#[derive(Parser, Debug)]
#[command(name = "quizalarmd")]
#[command(about = "Alarms dismissed by answering productivity questions", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/quizalarm/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set QUIZALARM_DATA_DIR env var)
    #[arg(short, long, env = "QUIZALARM_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Main service state
struct Service {
    core: QuizAlarmCore,
    device: Arc<DesktopDevice>,
    events: EventReceiver,
}

impl Service {
    fn new(args: &Args) -> Result<Self> {
        let mut config = load_config_or_default(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;
        if let Some(data_dir) = &args.data_dir {
            config.data_dir = data_dir.clone();
        }

        info!(
            config_path = %args.config.display(),
            data_dir = %config.data_dir.display(),
            sync_enabled = config.sync.enabled,
            "Configuration loaded"
        );

        let store_path = config.store_path();
        let store: Arc<dyn KeyValueStore> = Arc::new(
            SqliteStore::open(&store_path)
                .with_context(|| format!("Failed to open store at {:?}", store_path))?,
        );
        info!(path = %store_path.display(), "Store opened");

        let device = Arc::new(DesktopDevice::new().context("Failed to initialize desktop device")?);
        let (core, events) = QuizAlarmCore::new(store, DeviceParts::from_device(device.clone()), config)
            .context("Failed to initialize core services")?;

        Ok(Self {
            core,
            device,
            events,
        })
    }

    async fn run(self) -> Result<()> {
        let Self {
            core,
            device,
            mut events,
        } = self;

        let mut device_events = device.subscribe();
        let armed = core.start().await;
        info!(armed, "Alarms armed");

        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        println!("quizalarm ready, {armed} alarm(s) armed. Type `help` for commands.");
        info!("Service running");

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }

                Some(event) = device_events.recv() => {
                    if let Some(view) = core.handle_device_event(event) {
                        print_question(&view);
                    }
                }

                Some(event) = events.recv() => {
                    handle_core_event(event);
                }

                line = lines.next_line(), if stdin_open => match line {
                    Ok(Some(line)) => {
                        if !handle_line(&core, &line).await {
                            info!("Quit requested");
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!("Console input closed");
                        stdin_open = false;
                    }
                    Err(e) => {
                        warn!(error = %e, "Console read failed");
                        stdin_open = false;
                    }
                },
            }
        }

        info!("Shutting down quizalarmd");
        core.shutdown().await;
        info!("Shutdown complete");
        Ok(())
    }
}

/// Returns false when the console asked to quit
async fn handle_line(core: &QuizAlarmCore, line: &str) -> bool {
    match parse_command(line) {
        Ok(Some(ConsoleCommand::Quit)) => false,
        Ok(Some(command)) => {
            execute(core, command).await;
            true
        }
        Ok(None) => true,
        Err(msg) => {
            println!("{msg}");
            true
        }
    }
}

async fn execute(core: &QuizAlarmCore, command: ConsoleCommand) {
    match command {
        ConsoleCommand::Answer(is_yes) => match core.dismissal().answer(is_yes).await {
            AnswerOutcome::Ignored => println!("No alarm is ringing."),
            AnswerOutcome::Scored { points, .. } => {
                println!("{points:+} pts");
                if let Some(view) = core.dismissal().current() {
                    print_question(&view);
                }
            }
            AnswerOutcome::Completed {
                points,
                points_delta,
                ..
            } => println!("{points:+} pts. Alarm dismissed, {points_delta:+} pts this session."),
        },

        ConsoleCommand::Abandon => match core.dismissal().abandon().await {
            Ok(()) => println!("Alarm screen closed."),
            Err(e) => println!("{e}"),
        },

        ConsoleCommand::List => {
            let snapshot = core.snapshot();
            for alarm in &snapshot.alarms {
                let armed = core.scheduler().live_handle(alarm.id).is_some();
                println!(
                    "#{} {} {:<16} {} question(s) {}{}",
                    alarm.id,
                    alarm.time_label(),
                    alarm.repeat.to_string(),
                    alarm.questions_to_answer,
                    if alarm.enabled { "on" } else { "off" },
                    if alarm.enabled && !armed { " (not armed)" } else { "" },
                );
            }
        }

        ConsoleCommand::Status => {
            let snapshot = core.snapshot();
            println!(
                "balance {} pts ({} TND), {} alarm(s) armed",
                snapshot.balance, snapshot.balance_value, snapshot.armed
            );
            println!(
                "sync {} (last: {})",
                if snapshot.sync_enabled { "on" } else { "off" },
                snapshot
                    .last_sync
                    .map(|ms| ms.to_string())
                    .unwrap_or_else(|| "never".into())
            );
            match snapshot.session {
                Some(view) => print_question(&view),
                None => println!("no alarm ringing"),
            }
        }

        ConsoleCommand::Toggle(id) => match core.toggle_alarm(id).await {
            Ok(enabled) => println!("Alarm #{id} {}", if enabled { "on" } else { "off" }),
            Err(e) => println!("{e}"),
        },

        ConsoleCommand::Update(id, patch) => match core.update_alarm(id, patch).await {
            Ok(alarm) => println!(
                "Alarm #{} {} {} ({} question(s))",
                alarm.id,
                alarm.time_label(),
                alarm.repeat,
                alarm.questions_to_answer
            ),
            Err(e) => println!("{e}"),
        },

        ConsoleCommand::Balance => {
            let balance = core.ledger().balance();
            println!("{balance} pts = {} TND", core.ledger().format_value(balance));
        }

        ConsoleCommand::History => {
            let history = core.ledger().history();
            if history.is_empty() {
                println!("no history");
            }
            for entry in history.iter().take(10) {
                println!("{:>+6}  {}", entry.points, entry.action);
            }
        }

        ConsoleCommand::Redeem => match core.ledger().redeem() {
            Ok(r) => println!("Redeemed {} pts, {} left.", r.redeemed, r.balance),
            Err(e) => println!("{e}"),
        },

        ConsoleCommand::Reset => match core.ledger().reset() {
            Ok(()) => println!("Balance reset."),
            Err(e) => println!("{e}"),
        },

        ConsoleCommand::Questions => {
            for question in core.questions().pool() {
                println!(
                    "{:>2}. {} ({:+}/{:+})",
                    question.id, question.text, question.yes_points, question.no_points
                );
            }
        }

        ConsoleCommand::SyncBalance => {
            let ok = core.sync().sync_balance(core.ledger().balance(), None).await;
            println!("balance sync {}", if ok { "ok" } else { "failed" });
        }

        ConsoleCommand::SyncFull => {
            let ok = core.sync().sync_full_history().await;
            println!("history sync {}", if ok { "ok" } else { "failed" });
        }

        ConsoleCommand::Fetch => match core.sync().fetch_server_config().await {
            Some(config) => println!(
                "config fetched: rate {}, {} question(s)",
                core.ledger().conversion_rate(),
                config.questions.map(|q| q.len()).unwrap_or(0)
            ),
            None => println!("config fetch failed"),
        },

        ConsoleCommand::SyncEnabled(enabled) => match core.sync().set_enabled(enabled) {
            Ok(()) => println!("sync {}", if enabled { "on" } else { "off" }),
            Err(e) => println!("{e}"),
        },

        ConsoleCommand::Server(url) => match core.sync().set_server_url(&url) {
            Ok(()) => println!("server: {}", core.sync().server_url()),
            Err(e) => println!("{e}"),
        },

        ConsoleCommand::TimeLimit(secs) => {
            match core.dismissal().set_time_limit(Duration::from_secs(secs)) {
                Ok(()) => println!("time limit {secs}s"),
                Err(e) => println!("{e}"),
            }
        }

        ConsoleCommand::Help => println!("{HELP}"),

        ConsoleCommand::Quit => {}
    }
}

fn print_question(view: &SessionView) {
    match &view.current_question {
        Some(question) => println!(
            "[alarm #{} {}  {} left] {}  (yes/no)",
            view.alarm_id,
            view.progress_label(),
            format_duration(view.time_remaining),
            question.text
        ),
        None => println!("[alarm #{}] {:?}", view.alarm_id, view.state),
    }
}

fn handle_core_event(event: CoreEvent) {
    match event {
        CoreEvent::SessionStarted {
            session_id,
            alarm_id,
            total_questions,
            deadline,
        } => {
            info!(%session_id, %alarm_id, total_questions, %deadline, "Alarm ringing");
            println!("*** Alarm #{alarm_id} ***");
        }
        CoreEvent::AnswerScored {
            question_id,
            points,
            balance,
            answered,
            total,
            ..
        } => {
            debug!(%question_id, points, balance, answered, total, "Answer scored");
        }
        CoreEvent::SessionDismissed {
            alarm_id,
            points_delta,
            ..
        } => {
            info!(%alarm_id, points_delta, "Alarm dismissed");
        }
        CoreEvent::SessionExpired { alarm_id, .. } => {
            info!(%alarm_id, "Alarm time limit reached");
            println!("Time's up, alarm #{alarm_id} stopped.");
        }
        CoreEvent::SessionEnded {
            session_id, reason, ..
        } => {
            debug!(%session_id, ?reason, "Session ended");
        }
        CoreEvent::LeaveSession { session_id } => {
            debug!(%session_id, "Left alarm screen");
        }
        CoreEvent::TriggerRejected { alarm_id, active } => {
            warn!(%alarm_id, %active, "Alarm fired while another is ringing");
        }
        CoreEvent::AlarmToggled { alarm_id, enabled } => {
            debug!(%alarm_id, enabled, "Alarm toggled");
        }
        CoreEvent::SyncFinished { kind, success } => {
            if kind == SyncKind::Config && success {
                info!("Remote configuration applied");
            } else {
                debug!(?kind, success, "Sync finished");
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "quizalarmd starting");

    let service = Service::new(&args)?;
    service.run().await
}
