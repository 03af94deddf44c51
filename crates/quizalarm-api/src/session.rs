//! Dismissal session views

use quizalarm_util::{AlarmId, QuestionId, SessionId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Question;

/// Lifecycle state of a dismissal session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Selecting,
    Active,
    Dismissed,
    Expired,
    Abandoned,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Dismissed | Self::Expired | Self::Abandoned)
    }
}

/// Why a session left the active state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEndReason {
    /// Quota of answers reached
    Dismissed,
    /// Time limit reached
    Expired,
    /// User navigated away
    Abandoned,
}

/// Result of submitting an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// No session, or the session is no longer active
    Ignored,
    /// Answer scored, more questions remain
    Scored {
        question_id: QuestionId,
        points: i32,
        answered: usize,
        total: usize,
    },
    /// Answer scored and the quota is met
    Completed {
        question_id: QuestionId,
        points: i32,
        points_delta: i64,
    },
}

impl AnswerOutcome {
    pub fn points(&self) -> Option<i32> {
        match self {
            Self::Ignored => None,
            Self::Scored { points, .. } | Self::Completed { points, .. } => Some(*points),
        }
    }
}

/// Snapshot of the session for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub alarm_id: AlarmId,
    pub state: SessionState,
    pub current_question: Option<Question>,
    pub answered_count: usize,
    pub total_questions: usize,
    pub points_delta: i64,
    pub time_remaining: Duration,
    pub vibrating: bool,
}

impl SessionView {
    /// Progress label such as `2 / 5`
    pub fn progress_label(&self) -> String {
        let shown = (self.answered_count + 1).min(self.total_questions);
        format!("{} / {}", shown, self.total_questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!SessionState::Selecting.is_terminal());
        assert!(!SessionState::Active.is_terminal());
        assert!(SessionState::Dismissed.is_terminal());
        assert!(SessionState::Expired.is_terminal());
        assert!(SessionState::Abandoned.is_terminal());
    }

    #[test]
    fn answer_outcome_serialization() {
        let outcome = AnswerOutcome::Scored {
            question_id: QuestionId::new(3),
            points: 10,
            answered: 1,
            total: 5,
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"type\":\"scored\""));
        assert_eq!(outcome.points(), Some(10));
        assert_eq!(AnswerOutcome::Ignored.points(), None);
    }
}
