//! Persistent domain types

use chrono::{Datelike, Weekday};
use quizalarm_util::{AlarmId, QuestionId, WallClock};
use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Which days of the week an alarm rings on.
///
/// Stored as seven `0/1` integers, slot 0 being Monday. A mask with no slot
/// set rings every day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RepeatMask([bool; 7]);

impl RepeatMask {
    pub const WEEKDAYS: RepeatMask = RepeatMask([true, true, true, true, true, false, false]);
    pub const EVERY_DAY: RepeatMask = RepeatMask([true; 7]);

    pub const fn new(slots: [bool; 7]) -> Self {
        Self(slots)
    }

    /// Slot index for a weekday. The only place the calendar mapping lives.
    pub fn weekday_slot(day: Weekday) -> usize {
        day.num_days_from_monday() as usize
    }

    pub fn slots(&self) -> [bool; 7] {
        self.0
    }

    pub fn is_set(&self, slot: usize) -> bool {
        self.0.get(slot).copied().unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|s| !s)
    }

    /// Whether the alarm rings on the given day
    pub fn fires_on(&self, day: Weekday) -> bool {
        self.is_empty() || self.is_set(Self::weekday_slot(day))
    }

    pub fn fires_on_date<D: Datelike>(&self, date: &D) -> bool {
        self.fires_on(date.weekday())
    }
}

impl fmt::Display for RepeatMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
        if self.is_empty() || *self == Self::EVERY_DAY {
            return write!(f, "daily");
        }
        if *self == Self::WEEKDAYS {
            return write!(f, "Mon-Fri");
        }
        let days: Vec<&str> = NAMES
            .iter()
            .enumerate()
            .filter(|(i, _)| self.0[*i])
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{}", days.join(","))
    }
}

impl Serialize for RepeatMask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ints: [u8; 7] = self.0.map(u8::from);
        ints.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RepeatMask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(RepeatMaskVisitor)
    }
}

/// A single repeat slot, written by the watch either as `0/1` or as a bool
#[derive(Deserialize)]
#[serde(untagged)]
enum Slot {
    Flag(bool),
    Int(i64),
}

struct RepeatMaskVisitor;

impl<'de> Visitor<'de> for RepeatMaskVisitor {
    type Value = RepeatMask;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a list of 7 repeat flags")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RepeatMask, A::Error> {
        let mut slots = [false; 7];
        let mut len = 0usize;
        while let Some(slot) = seq.next_element::<Slot>()? {
            if len >= 7 {
                return Err(de::Error::invalid_length(len + 1, &self));
            }
            slots[len] = match slot {
                Slot::Flag(b) => b,
                Slot::Int(n) => n != 0,
            };
            len += 1;
        }
        if len != 7 {
            return Err(de::Error::invalid_length(len, &self));
        }
        Ok(RepeatMask(slots))
    }
}

/// A recurring alarm definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub id: AlarmId,
    pub hour: u8,
    pub minute: u8,
    pub enabled: bool,
    pub questions_to_answer: u32,
    pub repeat: RepeatMask,
}

impl Alarm {
    /// The first-run definition for `id`: disabled, 08:00, five questions, Mon-Fri
    pub fn default_for(id: AlarmId) -> Self {
        Self {
            id,
            hour: 8,
            minute: 0,
            enabled: false,
            questions_to_answer: 5,
            repeat: RepeatMask::WEEKDAYS,
        }
    }

    /// Time of day, if hour and minute are in range
    pub fn clock(&self) -> Option<WallClock> {
        WallClock::new(self.hour, self.minute)
    }

    pub fn time_label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

/// Partial update of an alarm. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions_to_answer: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatMask>,
}

impl AlarmPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge this patch over `alarm`, returning the candidate definition
    pub fn apply_to(&self, alarm: &Alarm) -> Alarm {
        Alarm {
            id: alarm.id,
            hour: self.hour.unwrap_or(alarm.hour),
            minute: self.minute.unwrap_or(alarm.minute),
            enabled: self.enabled.unwrap_or(alarm.enabled),
            questions_to_answer: self.questions_to_answer.unwrap_or(alarm.questions_to_answer),
            repeat: self.repeat.unwrap_or(alarm.repeat),
        }
    }
}

/// A yes/no self-assessment question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub yes_points: i32,
    pub no_points: i32,
}

impl Question {
    /// Generated filler for pool slot `index`
    pub fn placeholder(index: usize) -> Self {
        Self {
            id: QuestionId::new(index as u32),
            text: format!("Did you complete task {}?", index + 1),
            yes_points: 10,
            no_points: -5,
        }
    }

    pub fn points_for(&self, is_yes: bool) -> i32 {
        if is_yes { self.yes_points } else { self.no_points }
    }
}

/// One balance adjustment, newest first in the stored list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub action: String,
    pub points: i64,
}

impl HistoryEntry {
    pub fn new(timestamp: i64, action: impl Into<String>, points: i64) -> Self {
        Self {
            timestamp,
            action: action.into(),
            points,
        }
    }

    /// Entry recorded for an answered question
    pub fn answered(timestamp: i64, question_text: &str, points: i64) -> Self {
        let prefix: String = question_text.chars().take(20).collect();
        Self::new(timestamp, format!("Answered: {prefix}..."), points)
    }

    /// Entry recorded when `amount` points are redeemed
    pub fn redeemed(timestamp: i64, amount: i64) -> Self {
        Self::new(timestamp, "Redeemed", -amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_mask_serializes_as_ints() {
        let json = serde_json::to_string(&RepeatMask::WEEKDAYS).unwrap();
        assert_eq!(json, "[1,1,1,1,1,0,0]");
    }

    #[test]
    fn repeat_mask_accepts_bools_and_ints() {
        let from_ints: RepeatMask = serde_json::from_str("[1,1,1,1,1,0,0]").unwrap();
        let from_bools: RepeatMask =
            serde_json::from_str("[true,true,true,true,true,false,false]").unwrap();
        assert_eq!(from_ints, RepeatMask::WEEKDAYS);
        assert_eq!(from_bools, RepeatMask::WEEKDAYS);

        assert!(serde_json::from_str::<RepeatMask>("[1,1,1]").is_err());
        assert!(serde_json::from_str::<RepeatMask>("[1,1,1,1,1,1,1,1]").is_err());
    }

    #[test]
    fn repeat_mask_weekday_mapping() {
        let mask = RepeatMask::WEEKDAYS;
        assert!(mask.fires_on(Weekday::Mon));
        assert!(mask.fires_on(Weekday::Fri));
        assert!(!mask.fires_on(Weekday::Sat));
        assert!(!mask.fires_on(Weekday::Sun));

        let empty = RepeatMask::default();
        assert!(empty.fires_on(Weekday::Sun));
        assert_eq!(empty.to_string(), "daily");
        assert_eq!(mask.to_string(), "Mon-Fri");
    }

    #[test]
    fn alarm_json_uses_camel_case() {
        let alarm = Alarm::default_for(AlarmId::new(3));
        let value = serde_json::to_value(&alarm).unwrap();
        assert_eq!(value["questionsToAnswer"], 5);
        assert_eq!(value["repeat"], serde_json::json!([1, 1, 1, 1, 1, 0, 0]));
        assert_eq!(value["enabled"], false);
    }

    #[test]
    fn patch_merges_present_fields_only() {
        let alarm = Alarm::default_for(AlarmId::new(0));
        let patch = AlarmPatch {
            hour: Some(6),
            enabled: Some(true),
            ..Default::default()
        };
        let merged = patch.apply_to(&alarm);
        assert_eq!(merged.hour, 6);
        assert_eq!(merged.minute, 0);
        assert!(merged.enabled);
        assert_eq!(merged.questions_to_answer, 5);
        assert!(AlarmPatch::default().is_empty());
    }

    #[test]
    fn answered_action_truncates_text() {
        let entry = HistoryEntry::answered(1, "Did you drink enough water today?", 10);
        assert_eq!(entry.action, "Answered: Did you drink enough...");

        let redeemed = HistoryEntry::redeemed(2, 1000);
        assert_eq!(redeemed.points, -1000);
        assert_eq!(redeemed.action, "Redeemed");
    }

    #[test]
    fn placeholder_question() {
        let q = Question::placeholder(4);
        assert_eq!(q.text, "Did you complete task 5?");
        assert_eq!(q.points_for(true), 10);
        assert_eq!(q.points_for(false), -5);
    }
}
