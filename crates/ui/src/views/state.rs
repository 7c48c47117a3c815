use services::FailureKind;

/// User-facing failure notices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    NoQuestions,
    StartFailed,
    LoadFailed,
}

impl ViewError {
    #[must_use]
    pub fn from_failure(kind: FailureKind) -> Self {
        match kind {
            FailureKind::NoQuestionsAvailable => ViewError::NoQuestions,
            FailureKind::SourceUnavailable => ViewError::StartFailed,
            FailureKind::QuestionNotFound | FailureKind::QuestionLoadFailed => {
                ViewError::LoadFailed
            }
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::NoQuestions => "No questions available.",
            ViewError::StartFailed => "Failed to start quiz. Please try again.",
            ViewError::LoadFailed => "Error loading question. Please try refreshing.",
        }
    }
}
