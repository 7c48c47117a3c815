mod answer;
mod ids;
mod question;
mod report;
mod session;

pub use ids::{ParseIdError, QuestionId};

pub use answer::AnsweredQuestion;
pub use question::{
    OptionKey, ParseOptionKeyError, Question, QuestionDraft, QuestionValidationError,
};
pub use report::{PASS_THRESHOLD, QuizReport, ReportError, Verdict};
pub use session::{Advance, QuizSession, SessionPhase, SessionStateError};
