//! Core events emitted by the services

use chrono::{DateTime, Local};
use quizalarm_api::SessionEndReason;
use quizalarm_util::{AlarmId, QuestionId, SessionId};
use tokio::sync::mpsc;

/// Which sync call finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    Balance,
    FullHistory,
    Config,
}

/// Events emitted by the core services
#[derive(Debug, Clone)]
pub enum CoreEvent {
    /// Dismissal session started
    SessionStarted {
        session_id: SessionId,
        alarm_id: AlarmId,
        total_questions: usize,
        deadline: DateTime<Local>,
    },

    /// An answer was scored and the balance adjusted
    AnswerScored {
        session_id: SessionId,
        question_id: QuestionId,
        points: i32,
        balance: i64,
        answered: usize,
        total: usize,
    },

    /// All questions answered
    SessionDismissed {
        session_id: SessionId,
        alarm_id: AlarmId,
        points_delta: i64,
    },

    /// Time limit reached before the quota was met
    SessionExpired {
        session_id: SessionId,
        alarm_id: AlarmId,
    },

    /// Session left the active state
    SessionEnded {
        session_id: SessionId,
        alarm_id: AlarmId,
        reason: SessionEndReason,
    },

    /// Exit delay elapsed; the session view should close
    LeaveSession { session_id: SessionId },

    /// A fired alarm was ignored because a session was already running
    TriggerRejected { alarm_id: AlarmId, active: AlarmId },

    /// Alarm enabled flag flipped
    AlarmToggled { alarm_id: AlarmId, enabled: bool },

    /// A background sync call completed
    SyncFinished { kind: SyncKind, success: bool },
}

/// Sending half of the core event stream
pub type EventSender = mpsc::UnboundedSender<CoreEvent>;

/// Receiving half of the core event stream
pub type EventReceiver = mpsc::UnboundedReceiver<CoreEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
