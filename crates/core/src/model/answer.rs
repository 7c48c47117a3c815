use std::sync::Arc;

use crate::model::question::{OptionKey, Question};

/// History record for a question the user has moved past.
///
/// Created once when the user advances, never mutated afterwards. Correctness is
/// derived from the selection, so it cannot disagree with the question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredQuestion {
    question: Arc<Question>,
    selected: OptionKey,
    is_correct: bool,
}

impl AnsweredQuestion {
    #[must_use]
    pub fn new(question: Arc<Question>, selected: OptionKey) -> Self {
        let is_correct = question.is_correct(selected);
        Self {
            question,
            selected,
            is_correct,
        }
    }

    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    #[must_use]
    pub fn selected(&self) -> OptionKey {
        self.selected
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    /// Text of the option the user picked.
    #[must_use]
    pub fn selected_text(&self) -> &str {
        self.question.option_text(self.selected).unwrap_or_default()
    }

    #[must_use]
    pub fn correct_text(&self) -> &str {
        self.question.correct_text()
    }
}
