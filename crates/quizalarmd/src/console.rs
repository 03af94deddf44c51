//! Text console standing in for the watch screens

use quizalarm_api::{AlarmPatch, RepeatMask};
use quizalarm_config::{RawDays, parse_days, parse_time};
use quizalarm_util::AlarmId;

/// A parsed console line
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Answer(bool),
    Abandon,
    List,
    Status,
    Toggle(AlarmId),
    Update(AlarmId, AlarmPatch),
    Balance,
    History,
    Redeem,
    Reset,
    Questions,
    SyncBalance,
    SyncFull,
    Fetch,
    SyncEnabled(bool),
    Server(String),
    TimeLimit(u64),
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  yes | no                 answer the current question
  skip                     leave the alarm screen
  list                     show alarms
  toggle N                 enable/disable alarm N
  set N HH:MM              change alarm N's time
  ask N COUNT              questions needed to dismiss alarm N
  days N weekdays|weekends|daily|mon,tue,...
  status | balance | history | questions
  redeem | reset
  sync | sync full | fetch | sync on | sync off
  server URL               backend base URL (empty to clear)
  limit SECONDS            session time limit
  quit";

fn alarm_id(arg: Option<&str>) -> Result<AlarmId, String> {
    let raw = arg.ok_or("missing alarm number")?;
    raw.parse::<u32>()
        .map(AlarmId::new)
        .map_err(|_| format!("not an alarm number: {raw}"))
}

fn repeat_arg(arg: &str) -> Result<RepeatMask, String> {
    let days = match arg {
        "weekdays" | "weekends" | "daily" => RawDays::Preset(arg.to_string()),
        list => RawDays::List(list.split(',').map(str::to_string).collect()),
    };
    parse_days(&days)
}

/// Parse one line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "yes" | "y" => ConsoleCommand::Answer(true),
        "no" | "n" => ConsoleCommand::Answer(false),
        "skip" | "back" => ConsoleCommand::Abandon,
        "list" | "ls" => ConsoleCommand::List,
        "status" => ConsoleCommand::Status,
        "toggle" => ConsoleCommand::Toggle(alarm_id(words.next())?),
        "set" => {
            let id = alarm_id(words.next())?;
            let (hour, minute) = parse_time(words.next().ok_or("missing time")?)?;
            ConsoleCommand::Update(
                id,
                AlarmPatch {
                    hour: Some(hour),
                    minute: Some(minute),
                    ..Default::default()
                },
            )
        }
        "ask" => {
            let id = alarm_id(words.next())?;
            let raw = words.next().ok_or("missing question count")?;
            let count = raw
                .parse::<u32>()
                .map_err(|_| format!("not a count: {raw}"))?;
            ConsoleCommand::Update(
                id,
                AlarmPatch {
                    questions_to_answer: Some(count),
                    ..Default::default()
                },
            )
        }
        "days" => {
            let id = alarm_id(words.next())?;
            let repeat = repeat_arg(words.next().ok_or("missing days")?)?;
            ConsoleCommand::Update(
                id,
                AlarmPatch {
                    repeat: Some(repeat),
                    ..Default::default()
                },
            )
        }
        "balance" => ConsoleCommand::Balance,
        "history" => ConsoleCommand::History,
        "redeem" => ConsoleCommand::Redeem,
        "reset" => ConsoleCommand::Reset,
        "questions" => ConsoleCommand::Questions,
        "sync" => match words.next() {
            None => ConsoleCommand::SyncBalance,
            Some("full") => ConsoleCommand::SyncFull,
            Some("on") => ConsoleCommand::SyncEnabled(true),
            Some("off") => ConsoleCommand::SyncEnabled(false),
            Some(other) => return Err(format!("unknown sync option: {other}")),
        },
        "fetch" => ConsoleCommand::Fetch,
        "server" => ConsoleCommand::Server(words.next().unwrap_or_default().to_string()),
        "limit" => {
            let raw = words.next().ok_or("missing seconds")?;
            let secs = raw
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| format!("not a positive number of seconds: {raw}"))?;
            ConsoleCommand::TimeLimit(secs)
        }
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };

    Ok(Some(command))
}
