use quiz_core::model::{OptionKey, Question, QuestionId, QuizReport, Verdict};

/// Presentation-agnostic state of the quiz.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no localization assumptions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    NotStarted,
    /// Waiting for the id list of a new session.
    Starting,
    /// Waiting for the current question's content.
    Loading,
    /// The current question failed to load; nothing can be selected.
    LoadFailed,
    AwaitingSelection,
    SelectionPending,
    Finished,
}

/// Which screen the renderer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizScreen {
    Start,
    Question,
    Result,
}

/// User-visible failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    SourceUnavailable,
    NoQuestionsAvailable,
    QuestionNotFound,
    QuestionLoadFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub key: OptionKey,
    pub text: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<OptionView>,
}

impl QuestionView {
    #[must_use]
    pub fn from_question(question: &Question, pending: Option<OptionKey>) -> Self {
        Self {
            id: question.id().clone(),
            prompt: question.prompt().to_owned(),
            options: question
                .options()
                .map(|(key, text)| OptionView {
                    key,
                    text: text.to_owned(),
                    selected: pending == Some(key),
                })
                .collect(),
        }
    }
}

/// One row of the per-question summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSummaryItem {
    /// 1-based position in the session.
    pub number: usize,
    pub prompt: String,
    pub selected_key: OptionKey,
    pub selected_text: String,
    pub correct_key: OptionKey,
    pub correct_text: String,
    pub explanation: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportView {
    pub score: u32,
    pub total: u32,
    pub percentage: f64,
    pub verdict: Verdict,
    /// Whole seconds between the session start and its last answer.
    pub elapsed_secs: u64,
    pub items: Vec<AnswerSummaryItem>,
}

impl ReportView {
    #[must_use]
    pub fn from_report(report: &QuizReport) -> Self {
        let items = report
            .answers()
            .iter()
            .enumerate()
            .map(|(index, answer)| {
                let question = answer.question();
                AnswerSummaryItem {
                    number: index + 1,
                    prompt: question.prompt().to_owned(),
                    selected_key: answer.selected(),
                    selected_text: answer.selected_text().to_owned(),
                    correct_key: question.correct_answer(),
                    correct_text: answer.correct_text().to_owned(),
                    explanation: question.explanation().to_owned(),
                    is_correct: answer.is_correct(),
                }
            })
            .collect();

        Self {
            score: report.score(),
            total: report.total(),
            percentage: report.percentage(),
            verdict: report.verdict(),
            elapsed_secs: u64::try_from(report.duration().num_seconds()).unwrap_or_default(),
            items,
        }
    }
}

/// Everything a renderer needs to paint the current state.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSnapshot {
    pub phase: QuizPhase,
    pub screen: QuizScreen,
    pub busy: bool,
    /// 0-based index of the current question.
    pub position: usize,
    pub total: usize,
    /// `position / total`, in `[0, 1)` while questions remain.
    pub progress: f64,
    /// Running score; renderers decide whether to show it.
    pub score: u32,
    pub question: Option<QuestionView>,
    pub next_enabled: bool,
    pub notice: Option<FailureKind>,
    pub report: Option<ReportView>,
}

impl QuizSnapshot {
    #[must_use]
    pub fn not_started() -> Self {
        Self {
            phase: QuizPhase::NotStarted,
            screen: QuizScreen::Start,
            busy: false,
            position: 0,
            total: 0,
            progress: 0.0,
            score: 0,
            question: None,
            next_enabled: false,
            notice: None,
            report: None,
        }
    }
}
