//! SQLite persistence for the sync backend

use quizalarm_api::{HistoryEntry, QUESTION_POOL_SIZE, Question, UserData};
use quizalarm_util::QuestionId;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Most history rows returned for one device
pub const HISTORY_PAGE: usize = 100;

pub const TND_RATE_KEY: &str = "tndRate";
pub const QUESTIONS_KEY: &str = "questions";

const QUESTION_TEMPLATES: [&str; 10] = [
    "Did you complete your morning routine?",
    "Did you exercise today?",
    "Did you drink enough water?",
    "Did you study/work for your goals?",
    "Did you take breaks during work?",
    "Did you eat healthy meals?",
    "Did you avoid procrastination?",
    "Did you help someone today?",
    "Did you learn something new?",
    "Did you maintain good posture?",
];

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(e: rusqlite::Error) -> Self {
        RepositoryError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(e: serde_json::Error) -> Self {
        RepositoryError::Serialization(e.to_string())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Question pool served before anyone edits it: the templates repeated to
/// fill every slot
pub fn default_questions() -> Vec<Question> {
    (0..QUESTION_POOL_SIZE)
        .map(|i| Question {
            id: QuestionId::new(i as u32),
            text: QUESTION_TEMPLATES[i % QUESTION_TEMPLATES.len()].to_string(),
            yes_points: 10,
            no_points: -5,
        })
        .collect()
}

/// Users, their history and the shared configuration
pub struct Repository {
    conn: Mutex<Connection>,
}

impl Repository {
    /// Open or create a database at the given path
    pub fn open(path: impl AsRef<Path>, default_tnd_rate: f64) -> RepositoryResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let repo = Self {
            conn: Mutex::new(conn),
        };
        repo.init_schema(default_tnd_rate)?;
        Ok(repo)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory(default_tnd_rate: f64) -> RepositoryResult<Self> {
        let repo = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        repo.init_schema(default_tnd_rate)?;
        Ok(repo)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| {
            warn!("Repository lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn init_schema(&self, default_tnd_rate: f64) -> RepositoryResult<()> {
        let conn = self.conn();

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                device_id TEXT PRIMARY KEY,
                balance INTEGER NOT NULL DEFAULT 0,
                last_sync INTEGER,
                created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
            );

            CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                device_id TEXT NOT NULL,
                action TEXT NOT NULL,
                points INTEGER NOT NULL,
                timestamp INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_history_device
                ON history(device_id, timestamp DESC);

            CREATE TABLE IF NOT EXISTS config (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
            );
            "#,
        )?;

        let questions = serde_json::to_string(&default_questions())?;
        let seeded = conn.execute(
            "INSERT OR IGNORE INTO config (key, value) VALUES (?, ?), (?, ?)",
            params![
                TND_RATE_KEY,
                default_tnd_rate.to_string(),
                QUESTIONS_KEY,
                questions
            ],
        )?;
        if seeded > 0 {
            info!(keys = seeded, tnd_rate = default_tnd_rate, "Default configuration inserted");
        }

        debug!("Repository schema initialized");
        Ok(())
    }

    /// Store a balance together with a batch of history rows, atomically.
    /// Returns the number of rows inserted.
    pub fn save_sync(
        &self,
        device_id: &str,
        balance: i64,
        timestamp: i64,
        entries: &[HistoryEntry],
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        upsert_user(&tx, device_id, balance, timestamp)?;
        for entry in entries {
            insert_history(&tx, device_id, entry)?;
        }
        tx.commit()?;

        debug!(device_id, balance, entries = entries.len(), "Sync batch saved");
        Ok(entries.len())
    }

    /// The stored record for a device, newest history first
    pub fn user_data(&self, device_id: &str) -> RepositoryResult<Option<UserData>> {
        let conn = self.conn();

        let user = conn
            .query_row(
                "SELECT balance, last_sync, created_at FROM users WHERE device_id = ?",
                [device_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Option<i64>>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((balance, last_sync, created_at)) = user else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            r#"
            SELECT timestamp, action, points FROM history
            WHERE device_id = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )?;
        let history = stmt
            .query_map(params![device_id, HISTORY_PAGE as i64], |row| {
                Ok(HistoryEntry::new(row.get(0)?, row.get::<_, String>(1)?, row.get(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(UserData {
            device_id: device_id.to_string(),
            balance,
            last_sync,
            created_at,
            history,
        }))
    }

    /// Every configuration key with its decoded value
    pub fn config(&self) -> RepositoryResult<Map<String, Value>> {
        let conn = self.conn();

        let mut stmt = conn.prepare("SELECT key, value FROM config ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut config = Map::new();
        for row in rows {
            let (key, raw) = row?;
            let value = decode_value(&key, raw);
            config.insert(key, value);
        }
        Ok(config)
    }

    /// Upsert each key of `updates` in one transaction
    pub fn update_config(&self, updates: &Map<String, Value>) -> RepositoryResult<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        for (key, value) in updates {
            tx.execute(
                r#"
                INSERT INTO config (key, value, updated_at)
                VALUES (?, ?, strftime('%s', 'now'))
                ON CONFLICT(key)
                DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
                params![key, value.to_string()],
            )?;
        }
        tx.commit()?;

        info!(keys = ?updates.keys().collect::<Vec<_>>(), "Configuration updated");
        Ok(())
    }

    /// The stored question list, or empty if the key is missing or not a list
    pub fn questions(&self) -> RepositoryResult<Vec<Value>> {
        let conn = self.conn();

        let raw: Option<String> = conn
            .query_row("SELECT value FROM config WHERE key = ?", [QUESTIONS_KEY], |row| row.get(0))
            .optional()?;

        match raw.map(|text| decode_value(QUESTIONS_KEY, text)) {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => {
                warn!("Stored questions are not a list");
                Ok(Vec::new())
            }
            None => Ok(Vec::new()),
        }
    }

    pub fn set_questions(&self, questions: &[Value]) -> RepositoryResult<()> {
        let mut updates = Map::new();
        updates.insert(QUESTIONS_KEY.to_string(), Value::Array(questions.to_vec()));
        self.update_config(&updates)
    }

    pub fn is_healthy(&self) -> bool {
        self.conn()
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok()
    }
}

fn upsert_user(conn: &Connection, device_id: &str, balance: i64, timestamp: i64) -> rusqlite::Result<usize> {
    conn.execute(
        r#"
        INSERT INTO users (device_id, balance, last_sync)
        VALUES (?, ?, ?)
        ON CONFLICT(device_id)
        DO UPDATE SET balance = excluded.balance, last_sync = excluded.last_sync
        "#,
        params![device_id, balance, timestamp],
    )
}

fn insert_history(conn: &Connection, device_id: &str, entry: &HistoryEntry) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO history (device_id, action, points, timestamp) VALUES (?, ?, ?, ?)",
        params![device_id, entry.action, entry.points, entry.timestamp],
    )
}

/// Stored text is JSON; anything that fails to parse is served as a string.
/// The rate is always served as a number when it parses as one.
fn decode_value(key: &str, raw: String) -> Value {
    let value = match serde_json::from_str::<Value>(&raw) {
        Ok(value) => value,
        Err(_) => Value::String(raw),
    };

    if key == TND_RATE_KEY {
        if let Value::String(text) = &value {
            if let Some(rate) = text.trim().parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                return Value::Number(rate);
            }
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repo() -> Repository {
        Repository::in_memory(0.001).unwrap()
    }

    #[test]
    fn defaults_are_seeded() {
        let repo = repo();
        let config = repo.config().unwrap();
        assert_eq!(config[TND_RATE_KEY], json!(0.001));

        let questions = repo.questions().unwrap();
        assert_eq!(questions.len(), QUESTION_POOL_SIZE);
        assert_eq!(questions[0]["text"], "Did you complete your morning routine?");
        assert_eq!(questions[10]["text"], "Did you complete your morning routine?");
        assert_eq!(questions[1]["yesPoints"], 10);
        assert_eq!(questions[1]["noPoints"], -5);
    }

    #[test]
    fn reopening_keeps_edited_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("server.db");

        {
            let repo = Repository::open(&path, 0.001).unwrap();
            let mut updates = Map::new();
            updates.insert(TND_RATE_KEY.into(), json!(0.002));
            repo.update_config(&updates).unwrap();
        }

        let repo = Repository::open(&path, 0.5).unwrap();
        assert_eq!(repo.config().unwrap()[TND_RATE_KEY], json!(0.002));
    }

    #[test]
    fn unknown_device_has_no_data() {
        assert!(repo().user_data("nobody").unwrap().is_none());
    }

    #[test]
    fn balance_upsert_and_history_order() {
        let repo = repo();
        let first = HistoryEntry::new(1_000, "first", 10);
        assert_eq!(repo.save_sync("dev", 100, 1_000, &[first]).unwrap(), 1);
        let second = HistoryEntry::new(2_000, "second", -5);
        assert_eq!(repo.save_sync("dev", 105, 2_000, &[second]).unwrap(), 1);
        assert_eq!(repo.save_sync("dev", 105, 2_000, &[]).unwrap(), 0);

        let data = repo.user_data("dev").unwrap().unwrap();
        assert_eq!(data.balance, 105);
        assert_eq!(data.last_sync, Some(2_000));
        assert!(data.created_at > 0);
        assert_eq!(data.history[0].action, "second");
        assert_eq!(data.history[1].action, "first");
    }

    #[test]
    fn history_is_capped() {
        let repo = repo();
        let entries: Vec<_> = (0..120)
            .map(|i| HistoryEntry::new(i, format!("entry {i}"), 1))
            .collect();
        assert_eq!(repo.save_sync("dev", 120, 120, &entries).unwrap(), 120);

        let data = repo.user_data("dev").unwrap().unwrap();
        assert_eq!(data.history.len(), HISTORY_PAGE);
        assert_eq!(data.history[0].timestamp, 119);
    }

    #[test]
    fn config_values_decode() {
        let repo = repo();
        let mut updates = Map::new();
        updates.insert("theme".into(), json!("dark"));
        updates.insert("limits".into(), json!({"max": 3}));
        updates.insert("beta".into(), json!(true));
        repo.update_config(&updates).unwrap();

        let config = repo.config().unwrap();
        assert_eq!(config["theme"], json!("dark"));
        assert_eq!(config["limits"], json!({"max": 3}));
        assert_eq!(config["beta"], json!(true));
    }

    #[test]
    fn string_rate_served_as_number() {
        let repo = repo();
        let mut updates = Map::new();
        updates.insert(TND_RATE_KEY.into(), json!("0.004"));
        repo.update_config(&updates).unwrap();
        assert_eq!(repo.config().unwrap()[TND_RATE_KEY], json!(0.004));
    }

    #[test]
    fn raw_text_is_served_as_string() {
        assert_eq!(decode_value("motd", "hello".into()), json!("hello"));
        assert_eq!(decode_value(TND_RATE_KEY, "0.01".into()), json!(0.01));
    }
}
