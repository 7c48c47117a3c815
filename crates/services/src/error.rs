//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{OptionKey, QuestionId, QuestionValidationError, SessionStateError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::quiz::FailureKind;

/// Errors emitted by `QuestionSource` adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionSourceError {
    #[error("question source unavailable: {0}")]
    Unavailable(String),
    #[error("question source request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("question {0} not found")]
    NotFound(QuestionId),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error(transparent)]
    Invalid(#[from] QuestionValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizEngine`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("another request is still in flight")]
    Busy,
    #[error("no quiz has been started")]
    NotStarted,
    #[error("quiz already finished")]
    Finished,
    #[error("quiz is not finished yet")]
    NotFinished,
    #[error("no question is loaded")]
    NoQuestionLoaded,
    #[error("option {0} is not available for the current question")]
    InvalidOption(OptionKey),
    #[error("no questions available")]
    NoQuestionsAvailable,
    #[error("failed to start quiz: {0}")]
    SourceUnavailable(#[source] QuestionSourceError),
    #[error("question {id} not found")]
    QuestionNotFound { id: QuestionId },
    #[error("failed to load question {id}: {source}")]
    QuestionLoadFailed {
        id: QuestionId,
        #[source]
        source: QuestionSourceError,
    },
    #[error("response discarded: a newer quiz session was started")]
    Superseded,
    #[error(transparent)]
    Session(SessionStateError),
}

impl QuizError {
    /// Classify a failed question fetch.
    #[must_use]
    pub fn from_load_failure(id: QuestionId, source: QuestionSourceError) -> Self {
        match source {
            QuestionSourceError::NotFound(_) => QuizError::QuestionNotFound { id },
            source => QuizError::QuestionLoadFailed { id, source },
        }
    }

    /// User-visible failure class, `None` for precondition violations.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            QuizError::SourceUnavailable(_) => Some(FailureKind::SourceUnavailable),
            QuizError::NoQuestionsAvailable => Some(FailureKind::NoQuestionsAvailable),
            QuizError::QuestionNotFound { .. } => Some(FailureKind::QuestionNotFound),
            QuizError::QuestionLoadFailed { .. } => Some(FailureKind::QuestionLoadFailed),
            _ => None,
        }
    }
}

impl From<SessionStateError> for QuizError {
    fn from(err: SessionStateError) -> Self {
        match err {
            SessionStateError::NoQuestions => QuizError::NoQuestionsAvailable,
            SessionStateError::Finished => QuizError::Finished,
            SessionStateError::NotFinished => QuizError::NotFinished,
            SessionStateError::NoQuestionLoaded => QuizError::NoQuestionLoaded,
            SessionStateError::InvalidOption(key) => QuizError::InvalidOption(key),
            other => QuizError::Session(other),
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Source(#[from] QuestionSourceError),
}
