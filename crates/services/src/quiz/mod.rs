//! Quiz Session Engine and the snapshot contract it exposes to renderers.

mod engine;
mod view;

pub use crate::error::QuizError;
pub use engine::{AdvanceOutcome, QuizEngine};
pub use view::{
    AnswerSummaryItem, FailureKind, OptionView, QuestionView, QuizPhase, QuizScreen,
    QuizSnapshot, ReportView,
};
