#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod quiz;
pub mod source;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use config::{QuestionSourceConfig, SourceKind};
pub use error::{AppServicesError, QuestionSourceError, QuizError};
pub use quiz::{
    AdvanceOutcome, AnswerSummaryItem, FailureKind, OptionView, QuestionView, QuizEngine,
    QuizPhase, QuizScreen, QuizSnapshot, ReportView,
};
pub use source::{HttpQuestionSource, QuestionBankSource, QuestionSource};
