//! Persistent alarm definitions

use quizalarm_api::{Alarm, DEFAULT_ALARM_COUNT, QUESTION_POOL_SIZE};
use quizalarm_store::{KeyValueStore, keys, load_or_else, save_typed};
use quizalarm_util::{AlarmId, QuizAlarmError, Result};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// The ten definitions written at first run
pub fn default_alarms() -> Vec<Alarm> {
    (0..DEFAULT_ALARM_COUNT)
        .map(|id| Alarm::default_for(AlarmId::new(id)))
        .collect()
}

/// Check a single definition's field ranges
pub fn validate_alarm(alarm: &Alarm) -> Result<()> {
    if alarm.hour >= 24 {
        return Err(QuizAlarmError::validation(format!(
            "alarm {}: hour {} out of range 0-23",
            alarm.id, alarm.hour
        )));
    }
    if alarm.minute >= 60 {
        return Err(QuizAlarmError::validation(format!(
            "alarm {}: minute {} out of range 0-59",
            alarm.id, alarm.minute
        )));
    }
    if alarm.questions_to_answer == 0 || alarm.questions_to_answer as usize > QUESTION_POOL_SIZE {
        return Err(QuizAlarmError::validation(format!(
            "alarm {}: questionsToAnswer must be between 1 and {}",
            alarm.id, QUESTION_POOL_SIZE
        )));
    }
    Ok(())
}

fn validate_all(alarms: &[Alarm]) -> Result<()> {
    let mut seen = HashSet::new();
    for alarm in alarms {
        if !seen.insert(alarm.id) {
            return Err(QuizAlarmError::validation(format!(
                "duplicate alarm id {}",
                alarm.id
            )));
        }
        validate_alarm(alarm)?;
    }
    Ok(())
}

/// CRUD over the stored alarm list.
///
/// Every write is validated and persisted before the in-memory copy changes.
/// Has no scheduling side effects.
pub struct AlarmRegistry {
    store: Arc<dyn KeyValueStore>,
    alarms: Mutex<Vec<Alarm>>,
}

impl AlarmRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let alarms = load_or_else(store.as_ref(), keys::ALARMS, default_alarms);
        debug!(count = alarms.len(), "Alarm registry loaded");
        Self {
            store,
            alarms: Mutex::new(alarms),
        }
    }

    fn alarms(&self) -> MutexGuard<'_, Vec<Alarm>> {
        self.alarms.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// All definitions, ordered by id
    pub fn all(&self) -> Vec<Alarm> {
        self.alarms().clone()
    }

    pub fn find(&self, id: AlarmId) -> Option<Alarm> {
        self.alarms().iter().find(|a| a.id == id).cloned()
    }

    /// Insert or replace the definition with `alarm.id`
    pub fn upsert(&self, alarm: Alarm) -> Result<()> {
        validate_alarm(&alarm)?;

        let mut alarms = self.alarms();
        let mut next = alarms.clone();
        match next.iter_mut().find(|a| a.id == alarm.id) {
            Some(existing) => *existing = alarm,
            None => {
                next.push(alarm);
                next.sort_by_key(|a| a.id);
            }
        }

        save_typed(self.store.as_ref(), keys::ALARMS, &next)?;
        *alarms = next;
        Ok(())
    }

    /// Replace the whole list
    pub fn replace_all(&self, mut list: Vec<Alarm>) -> Result<()> {
        validate_all(&list)?;
        list.sort_by_key(|a| a.id);

        let mut alarms = self.alarms();
        save_typed(self.store.as_ref(), keys::ALARMS, &list)?;
        *alarms = list;
        Ok(())
    }

    /// Write the default list, with `seeds` replacing matching ids, if no
    /// list is stored yet. Returns whether anything was written.
    pub fn ensure_defaults(&self, seeds: &[Alarm]) -> Result<bool> {
        if self.store.has(keys::ALARMS)? {
            return Ok(false);
        }

        let mut list = default_alarms();
        for seed in seeds {
            validate_alarm(seed)?;
            match list.iter_mut().find(|a| a.id == seed.id) {
                Some(slot) => *slot = seed.clone(),
                None => list.push(seed.clone()),
            }
        }

        self.replace_all(list)?;
        info!(seeded = seeds.len(), "Default alarms written");
        Ok(true)
    }

    /// Flip `enabled` and persist. Returns the new state.
    pub fn set_enabled(&self, id: AlarmId, enabled: bool) -> Result<Alarm> {
        let mut alarm = self.find(id).ok_or(QuizAlarmError::AlarmNotFound(id))?;
        alarm.enabled = enabled;
        self.upsert(alarm.clone())?;
        Ok(alarm)
    }
}
