//! Question Source adapters: where session ids and question content come from.

mod bank;
mod http;

use async_trait::async_trait;

use quiz_core::model::{Question, QuestionId};

pub use crate::error::QuestionSourceError;
pub use bank::QuestionBankSource;
pub use http::HttpQuestionSource;

/// Supplies the ordered id list for a session and question content by id.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Ordered question ids for a fresh session. May be empty.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError` on transport failures or invalid responses.
    async fn start_quiz(&self) -> Result<Vec<QuestionId>, QuestionSourceError>;

    /// Full content of a single question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError::NotFound` for unknown ids, other variants on
    /// transport failures or malformed content.
    async fn get_question(&self, id: &QuestionId) -> Result<Question, QuestionSourceError>;
}
