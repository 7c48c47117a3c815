use std::sync::Arc;

use async_trait::async_trait;
use rand::rng;
use rand::seq::SliceRandom;

use quiz_core::model::{Question, QuestionId};
use storage::repository::QuestionRepository;

use super::{QuestionSource, QuestionSourceError};
use crate::config::DEFAULT_SESSION_SIZE;

/// Serves sessions from the local question bank.
#[derive(Clone)]
pub struct QuestionBankSource {
    questions: Arc<dyn QuestionRepository>,
    session_size: usize,
    shuffle: bool,
}

impl QuestionBankSource {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionRepository>) -> Self {
        Self {
            questions,
            session_size: DEFAULT_SESSION_SIZE,
            shuffle: true,
        }
    }

    #[must_use]
    pub fn with_session_size(mut self, session_size: usize) -> Self {
        self.session_size = session_size;
        self
    }

    /// Disable shuffling so sessions follow the repository order.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }
}

#[async_trait]
impl QuestionSource for QuestionBankSource {
    async fn start_quiz(&self) -> Result<Vec<QuestionId>, QuestionSourceError> {
        let mut ids = self.questions.list_question_ids().await?;
        if self.shuffle {
            ids.shuffle(&mut rng());
        }
        ids.truncate(self.session_size);
        Ok(ids)
    }

    async fn get_question(&self, id: &QuestionId) -> Result<Question, QuestionSourceError> {
        self.questions
            .get_question(id)
            .await?
            .ok_or_else(|| QuestionSourceError::NotFound(id.clone()))
    }
}
