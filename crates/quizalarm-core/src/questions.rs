//! Question pool

use quizalarm_api::{QUESTION_POOL_SIZE, Question};
use quizalarm_store::{KeyValueStore, keys, load_or_else, save_if_absent, save_typed};
use quizalarm_util::{QuizAlarmError, Result};
use std::sync::Arc;
use tracing::info;

/// The generated pool written at first run
pub fn default_questions() -> Vec<Question> {
    (0..QUESTION_POOL_SIZE).map(Question::placeholder).collect()
}

/// Pad with placeholders or truncate so the pool has exactly
/// [`QUESTION_POOL_SIZE`] entries
pub fn normalize_pool(mut questions: Vec<Question>) -> Vec<Question> {
    questions.truncate(QUESTION_POOL_SIZE);
    for index in questions.len()..QUESTION_POOL_SIZE {
        questions.push(Question::placeholder(index));
    }
    questions
}

/// Stored question pool
pub struct QuestionBank {
    store: Arc<dyn KeyValueStore>,
}

impl QuestionBank {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Exactly [`QUESTION_POOL_SIZE`] questions
    pub fn pool(&self) -> Vec<Question> {
        let stored: Vec<Question> =
            load_or_else(self.store.as_ref(), keys::QUESTIONS, default_questions);
        normalize_pool(stored)
    }

    /// Replace the stored list
    pub fn replace(&self, questions: Vec<Question>) -> Result<()> {
        if questions.len() > QUESTION_POOL_SIZE {
            return Err(QuizAlarmError::validation(format!(
                "at most {} questions allowed, got {}",
                QUESTION_POOL_SIZE,
                questions.len()
            )));
        }
        if let Some(blank) = questions.iter().find(|q| q.text.trim().is_empty()) {
            return Err(QuizAlarmError::validation(format!(
                "question {} has no text",
                blank.id
            )));
        }

        save_typed(self.store.as_ref(), keys::QUESTIONS, &questions)?;
        info!(count = questions.len(), "Question pool replaced");
        Ok(())
    }

    pub fn ensure_defaults(&self) -> Result<bool> {
        Ok(save_if_absent(
            self.store.as_ref(),
            keys::QUESTIONS,
            &default_questions(),
        )?)
    }
}
