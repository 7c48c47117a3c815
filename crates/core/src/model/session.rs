use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::answer::AnsweredQuestion;
use crate::model::ids::QuestionId;
use crate::model::question::{OptionKey, Question};
use crate::model::report::{QuizReport, ReportError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("no questions available for session")]
    NoQuestions,

    #[error("session already finished")]
    Finished,

    #[error("session is not finished yet")]
    NotFinished,

    #[error("no question is loaded")]
    NoQuestionLoaded,

    #[error("option {0} is not available for the current question")]
    InvalidOption(OptionKey),

    #[error("expected question {expected}, got {actual}")]
    QuestionMismatch {
        expected: QuestionId,
        actual: QuestionId,
    },

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Where a session stands in its question loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// The question for the current index has not been installed (loading or failed).
    AwaitingQuestion,
    AwaitingSelection,
    SelectionPending,
    Finished,
}

/// Result of committing the pending selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    NextQuestion,
    Finished,
}

/// State of a single quiz run.
///
/// Invariants:
/// - `current <= question_ids.len()`, equal only once finished
/// - `answers.len() == current`
/// - `score` equals the number of correct answers
/// - `pending` is only set while a question is installed and names one of its options
#[derive(Debug, Clone)]
pub struct QuizSession {
    question_ids: Vec<QuestionId>,
    current: usize,
    score: u32,
    pending: Option<OptionKey>,
    question: Option<Arc<Question>>,
    answers: Vec<AnsweredQuestion>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Start a fresh session over the given ordered ids.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::NoQuestions` if `question_ids` is empty.
    pub fn new(
        question_ids: Vec<QuestionId>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionStateError> {
        if question_ids.is_empty() {
            return Err(SessionStateError::NoQuestions);
        }

        Ok(Self {
            question_ids,
            current: 0,
            score: 0,
            pending: None,
            question: None,
            answers: Vec::new(),
            started_at,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn question_ids(&self) -> &[QuestionId] {
        &self.question_ids
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.question_ids.len()
    }

    /// 0-based index of the question being answered.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn pending(&self) -> Option<OptionKey> {
        self.pending
    }

    #[must_use]
    pub fn answers(&self) -> &[AnsweredQuestion] {
        &self.answers
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.current >= self.question_ids.len()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.question.as_deref()
    }

    /// Id to fetch for the current index, `None` once finished.
    #[must_use]
    pub fn current_question_id(&self) -> Option<&QuestionId> {
        self.question_ids.get(self.current)
    }

    /// Share of questions already answered, in `[0, 1)` while questions remain.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        self.current as f64 / self.question_ids.len() as f64
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.is_finished() {
            SessionPhase::Finished
        } else if self.question.is_none() {
            SessionPhase::AwaitingQuestion
        } else if self.pending.is_some() {
            SessionPhase::SelectionPending
        } else {
            SessionPhase::AwaitingSelection
        }
    }

    /// Install the fetched question for the current index and clear any selection.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::Finished` once every question is answered.
    /// Returns `SessionStateError::QuestionMismatch` if the question belongs to another index.
    pub fn install_question(&mut self, question: Question) -> Result<(), SessionStateError> {
        let Some(expected) = self.current_question_id() else {
            return Err(SessionStateError::Finished);
        };
        if question.id() != expected {
            return Err(SessionStateError::QuestionMismatch {
                expected: expected.clone(),
                actual: question.id().clone(),
            });
        }

        self.question = Some(Arc::new(question));
        self.pending = None;
        Ok(())
    }

    /// Forget the current question, e.g. after its load failed.
    pub fn clear_question(&mut self) {
        self.question = None;
        self.pending = None;
    }

    /// Record a tentative selection, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::Finished`, `NoQuestionLoaded` or `InvalidOption`
    /// when the selection cannot apply to the current question.
    pub fn select(&mut self, key: OptionKey) -> Result<(), SessionStateError> {
        if self.is_finished() {
            return Err(SessionStateError::Finished);
        }
        let Some(question) = self.question.as_ref() else {
            return Err(SessionStateError::NoQuestionLoaded);
        };
        if !question.has_option(key) {
            return Err(SessionStateError::InvalidOption(key));
        }

        self.pending = Some(key);
        Ok(())
    }

    /// Commit the pending selection and move to the next index.
    ///
    /// Returns `None` without touching any state when nothing is selected or no
    /// question is loaded.
    pub fn commit(&mut self, at: DateTime<Utc>) -> Option<Advance> {
        if self.is_finished() {
            return None;
        }
        let selected = self.pending?;
        let question = self.question.take()?;

        let answer = AnsweredQuestion::new(question, selected);
        if answer.is_correct() {
            self.score = self.score.saturating_add(1);
        }
        self.answers.push(answer);
        self.pending = None;
        self.current += 1;

        if self.is_finished() {
            self.completed_at = Some(at);
            Some(Advance::Finished)
        } else {
            Some(Advance::NextQuestion)
        }
    }

    /// Build the final report.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::NotFinished` while questions remain.
    pub fn report(&self) -> Result<QuizReport, SessionStateError> {
        let Some(completed_at) = self.completed_at.filter(|_| self.is_finished()) else {
            return Err(SessionStateError::NotFinished);
        };
        Ok(QuizReport::from_answers(
            self.answers.clone(),
            self.started_at,
            completed_at,
        )?)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
