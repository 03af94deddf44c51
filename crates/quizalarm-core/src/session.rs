//! Dismissal session state machine
//!
//! Pure state: no timers, no I/O. The dismissal service drives it with
//! monotonic timestamps and performs the side effects it reports.

use chrono::{DateTime, Local};
use quizalarm_api::{AnswerOutcome, Question, SessionState, SessionView};
use quizalarm_util::{AlarmId, MonotonicInstant, SessionId};
use rand::Rng;
use std::time::Duration;

/// Pick `count` distinct questions from `pool`.
///
/// Fisher-Yates over the whole pool, then truncated. A pool smaller than
/// `count` is used in full.
pub fn select_questions<R: Rng + ?Sized>(
    pool: &[Question],
    count: usize,
    rng: &mut R,
) -> Vec<Question> {
    let mut shuffled = pool.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.gen_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled.truncate(count.min(pool.len()));
    shuffled
}

/// What the tick loop should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Session is not active; the loop should stop
    Idle,
    /// Active, nothing to do this tick
    Waiting,
    /// Active and vibrating; pulse the motor
    Pulse,
    /// Deadline reached on this tick
    Expired,
}

/// A fired alarm awaiting dismissal
#[derive(Debug)]
pub struct DismissalSession {
    pub session_id: SessionId,
    pub alarm_id: AlarmId,

    questions: Vec<Question>,
    current_index: usize,
    answered_count: usize,

    /// Wall-clock start (display only)
    pub started_at: DateTime<Local>,
    pub started_at_mono: MonotonicInstant,

    /// Wall-clock deadline (display only)
    pub deadline: DateTime<Local>,
    pub deadline_mono: MonotonicInstant,

    state: SessionState,
    vibrating: bool,
    points_delta: i64,
}

impl DismissalSession {
    /// New session in `Selecting` with the questions already chosen
    pub fn new(
        alarm_id: AlarmId,
        questions: Vec<Question>,
        time_limit: Duration,
        now: DateTime<Local>,
        now_mono: MonotonicInstant,
    ) -> Self {
        let deadline = chrono::Duration::from_std(time_limit)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(now);

        Self {
            session_id: SessionId::new(),
            alarm_id,
            questions,
            current_index: 0,
            answered_count: 0,
            started_at: now,
            started_at_mono: now_mono,
            deadline,
            deadline_mono: now_mono + time_limit,
            state: SessionState::Selecting,
            vibrating: false,
            points_delta: 0,
        }
    }

    /// Leave `Selecting`. An empty selection has nothing to answer and is
    /// dismissed immediately.
    pub fn start(&mut self) -> SessionState {
        if self.state != SessionState::Selecting {
            return self.state;
        }

        if self.questions.is_empty() {
            self.state = SessionState::Dismissed;
        } else {
            self.state = SessionState::Active;
            self.vibrating = true;
        }
        self.state
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn is_vibrating(&self) -> bool {
        self.vibrating
    }

    pub fn answered_count(&self) -> usize {
        self.answered_count
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn points_delta(&self) -> i64 {
        self.points_delta
    }

    pub fn selected_questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.is_active() {
            self.questions.get(self.current_index)
        } else {
            None
        }
    }

    pub fn time_remaining(&self, now_mono: MonotonicInstant) -> Duration {
        self.deadline_mono.saturating_duration_until(now_mono)
    }

    pub fn is_past_deadline(&self, now_mono: MonotonicInstant) -> bool {
        now_mono >= self.deadline_mono
    }

    /// Score the current question and advance.
    ///
    /// Ignored unless active. An answer arriving at or after the deadline
    /// expires the session instead of scoring.
    pub fn answer(&mut self, is_yes: bool, now_mono: MonotonicInstant) -> AnswerOutcome {
        if !self.is_active() {
            return AnswerOutcome::Ignored;
        }
        if self.is_past_deadline(now_mono) {
            self.expire();
            return AnswerOutcome::Ignored;
        }

        let Some(question) = self.questions.get(self.current_index) else {
            return AnswerOutcome::Ignored;
        };
        let question_id = question.id;
        let points = question.points_for(is_yes);

        self.points_delta += points as i64;
        self.answered_count += 1;
        self.current_index += 1;

        if self.answered_count >= self.questions.len() {
            self.state = SessionState::Dismissed;
            self.vibrating = false;
            AnswerOutcome::Completed {
                question_id,
                points,
                points_delta: self.points_delta,
            }
        } else {
            AnswerOutcome::Scored {
                question_id,
                points,
                answered: self.answered_count,
                total: self.questions.len(),
            }
        }
    }

    /// Advance the countdown
    pub fn tick(&mut self, now_mono: MonotonicInstant) -> TickOutcome {
        if !self.is_active() {
            return TickOutcome::Idle;
        }
        if self.is_past_deadline(now_mono) {
            self.expire();
            return TickOutcome::Expired;
        }
        if self.vibrating {
            TickOutcome::Pulse
        } else {
            TickOutcome::Waiting
        }
    }

    /// Force the time-limit transition. No-op once terminal.
    pub fn expire(&mut self) -> bool {
        self.end(SessionState::Expired)
    }

    /// The user left the session view. No-op once terminal.
    pub fn abandon(&mut self) -> bool {
        self.end(SessionState::Abandoned)
    }

    fn end(&mut self, state: SessionState) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = state;
        self.vibrating = false;
        true
    }

    pub fn view(&self, now_mono: MonotonicInstant) -> SessionView {
        SessionView {
            session_id: self.session_id,
            alarm_id: self.alarm_id,
            state: self.state,
            current_question: self.current_question().cloned(),
            answered_count: self.answered_count,
            total_questions: self.questions.len(),
            points_delta: self.points_delta,
            time_remaining: self.time_remaining(now_mono),
            vibrating: self.vibrating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizalarm_util::QuestionId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn pool(n: usize) -> Vec<Question> {
        (0..n).map(Question::placeholder).collect()
    }

    fn started(questions: Vec<Question>) -> (DismissalSession, MonotonicInstant) {
        let now_mono = MonotonicInstant::now();
        let mut session = DismissalSession::new(
            AlarmId::new(0),
            questions,
            Duration::from_secs(300),
            Local::now(),
            now_mono,
        );
        session.start();
        (session, now_mono)
    }

    #[test]
    fn selection_is_distinct_and_sized() {
        let mut rng = StdRng::seed_from_u64(7);
        let selected = select_questions(&pool(30), 5, &mut rng);
        assert_eq!(selected.len(), 5);

        let ids: HashSet<QuestionId> = selected.iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn selection_uses_whole_small_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        let selected = select_questions(&pool(3), 10, &mut rng);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn selections_vary_between_runs() {
        let mut rng = StdRng::seed_from_u64(42);
        let first = select_questions(&pool(30), 5, &mut rng);
        let differs = (0..20).any(|_| select_questions(&pool(30), 5, &mut rng) != first);
        assert!(differs);
    }

    #[test]
    fn n_answers_dismiss() {
        let (mut session, now) = started(pool(3));
        assert_eq!(session.state(), SessionState::Active);
        assert!(session.is_vibrating());

        assert!(matches!(
            session.answer(true, now),
            AnswerOutcome::Scored { answered: 1, total: 3, .. }
        ));
        session.answer(false, now);
        let last = session.answer(true, now);

        assert_eq!(
            last,
            AnswerOutcome::Completed {
                question_id: session.selected_questions()[2].id,
                points: 10,
                points_delta: 15,
            }
        );
        assert_eq!(session.state(), SessionState::Dismissed);
        assert!(!session.is_vibrating());
        assert!(session.current_question().is_none());
    }

    #[test]
    fn terminal_answer_is_noop() {
        let (mut session, now) = started(pool(1));
        session.answer(true, now);

        assert_eq!(session.answer(true, now), AnswerOutcome::Ignored);
        assert_eq!(session.answered_count(), 1);
        assert_eq!(session.points_delta(), 10);
    }

    #[test]
    fn deadline_expires() {
        let (mut session, now) = started(pool(5));

        assert_eq!(session.tick(now + Duration::from_secs(1)), TickOutcome::Pulse);
        assert_eq!(session.tick(now + Duration::from_secs(300)), TickOutcome::Expired);
        assert_eq!(session.state(), SessionState::Expired);
        assert_eq!(session.tick(now + Duration::from_secs(301)), TickOutcome::Idle);
        assert!(!session.expire());
    }

    #[test]
    fn late_answer_expires_without_scoring() {
        let (mut session, now) = started(pool(5));
        let late = now + Duration::from_secs(301);

        assert_eq!(session.answer(true, late), AnswerOutcome::Ignored);
        assert_eq!(session.state(), SessionState::Expired);
        assert_eq!(session.points_delta(), 0);
    }

    #[test]
    fn abandon_is_terminal() {
        let (mut session, now) = started(pool(5));
        assert!(session.abandon());
        assert!(!session.abandon());
        assert_eq!(session.state(), SessionState::Abandoned);
        assert_eq!(session.answer(true, now), AnswerOutcome::Ignored);
    }

    #[test]
    fn empty_selection_dismisses_at_start() {
        let (session, _) = started(Vec::new());
        assert_eq!(session.state(), SessionState::Dismissed);
        assert!(!session.is_vibrating());
    }

    #[test]
    fn view_reports_progress() {
        let (mut session, now) = started(pool(4));
        session.answer(true, now);

        let view = session.view(now + Duration::from_secs(10));
        assert_eq!(view.answered_count, 1);
        assert_eq!(view.total_questions, 4);
        assert_eq!(view.progress_label(), "2 / 4");
        assert_eq!(view.time_remaining, Duration::from_secs(290));
        assert!(view.current_question.is_some());
    }
}
