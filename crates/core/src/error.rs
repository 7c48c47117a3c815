use thiserror::Error;

use crate::model::{QuestionValidationError, ReportError, SessionStateError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    QuestionValidation(#[from] QuestionValidationError),
    #[error(transparent)]
    Session(#[from] SessionStateError),
    #[error(transparent)]
    Report(#[from] ReportError),
}
