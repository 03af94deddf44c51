//! Points balance and history

use quizalarm_api::{DEFAULT_TND_RATE, HISTORY_CAP, HistoryEntry, Question, REDEEM_UNIT};
use quizalarm_store::{KeyValueStore, keys, load_or_else, save_typed};
use quizalarm_util::{QuizAlarmError, Result};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Result of a redemption
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redemption {
    pub redeemed: i64,
    pub balance: i64,
}

/// Balance and newest-first history, both persisted on every change
pub struct Ledger {
    store: Arc<dyn KeyValueStore>,
    // Serializes read-modify-write cycles
    write: Mutex<()>,
}

impl Ledger {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write: Mutex::new(()),
        }
    }

    pub fn balance(&self) -> i64 {
        load_or_else(self.store.as_ref(), keys::BALANCE, || 0)
    }

    /// Newest first
    pub fn history(&self) -> Vec<HistoryEntry> {
        load_or_else(self.store.as_ref(), keys::HISTORY, Vec::new)
    }

    /// Adjust the balance by `points` and prepend a history entry
    pub fn apply(&self, points: i64, action: impl Into<String>) -> Result<(i64, HistoryEntry)> {
        let entry = HistoryEntry::new(quizalarm_util::now_millis(), action, points);
        self.record(entry)
    }

    /// Score an answer to `question`
    pub fn record_answer(&self, question: &Question, is_yes: bool) -> Result<(i64, HistoryEntry)> {
        let points = question.points_for(is_yes) as i64;
        let entry = HistoryEntry::answered(quizalarm_util::now_millis(), &question.text, points);
        self.record(entry)
    }

    fn record(&self, entry: HistoryEntry) -> Result<(i64, HistoryEntry)> {
        let _guard = self.write.lock().unwrap_or_else(|p| p.into_inner());

        let balance = self.balance() + entry.points;
        let mut history = self.history();
        history.insert(0, entry.clone());
        history.truncate(HISTORY_CAP);

        save_typed(self.store.as_ref(), keys::BALANCE, &balance)?;
        save_typed(self.store.as_ref(), keys::HISTORY, &history)?;

        debug!(points = entry.points, balance, "Balance adjusted");
        Ok((balance, entry))
    }

    /// Redeem whole multiples of [`REDEEM_UNIT`]
    pub fn redeem(&self) -> Result<Redemption> {
        let balance = self.balance();
        if balance < REDEEM_UNIT {
            return Err(QuizAlarmError::InsufficientBalance {
                balance,
                required: REDEEM_UNIT,
            });
        }

        let redeemed = (balance / REDEEM_UNIT) * REDEEM_UNIT;
        let entry = HistoryEntry::redeemed(quizalarm_util::now_millis(), redeemed);
        let (balance, _) = self.record(entry)?;

        info!(redeemed, balance, "Points redeemed");
        Ok(Redemption { redeemed, balance })
    }

    /// Zero the balance and clear history
    pub fn reset(&self) -> Result<()> {
        let _guard = self.write.lock().unwrap_or_else(|p| p.into_inner());
        save_typed(self.store.as_ref(), keys::BALANCE, &0i64)?;
        save_typed(self.store.as_ref(), keys::HISTORY, &Vec::<HistoryEntry>::new())?;
        info!("Ledger reset");
        Ok(())
    }

    pub fn conversion_rate(&self) -> f64 {
        load_or_else(self.store.as_ref(), keys::TND_RATE, || DEFAULT_TND_RATE)
    }

    pub fn set_conversion_rate(&self, rate: f64) -> Result<()> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(QuizAlarmError::validation(format!(
                "conversion rate must be a non-negative number, got {rate}"
            )));
        }
        save_typed(self.store.as_ref(), keys::TND_RATE, &rate)?;
        Ok(())
    }

    pub fn converted_value(&self, balance: i64) -> f64 {
        balance as f64 * self.conversion_rate()
    }

    /// Currency value of `balance`, three decimals
    pub fn format_value(&self, balance: i64) -> String {
        format!("{:.3}", self.converted_value(balance))
    }
}
