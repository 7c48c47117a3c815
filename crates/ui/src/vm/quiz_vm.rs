use quiz_core::model::{OptionKey, Verdict};
use services::{AnswerSummaryItem, QuizPhase, QuizScreen, QuizSnapshot, ReportView};

use crate::views::ViewError;

pub const PASS_MESSAGE: &str = "Great job! You passed!";
pub const FAIL_MESSAGE: &str = "Keep practicing. You need 80% to pass.";
/// The running score stays hidden until the result screen.
pub const HIDDEN_SCORE_LABEL: &str = "Score: Hidden";

/// The only actions the UI sends into the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizIntent {
    Start,
    Select(OptionKey),
    Next,
    /// Reload the current question after a failed fetch.
    Retry,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartScreenVm {
    pub start_label: &'static str,
    pub start_disabled: bool,
    pub error: Option<ViewError>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionButtonVm {
    pub key: OptionKey,
    pub label: String,
    pub class: &'static str,
    pub disabled: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuestionScreenVm {
    pub counter_label: String,
    pub progress_percent: f64,
    pub score_label: &'static str,
    /// `None` while the question is loading or failed to load.
    pub prompt: Option<String>,
    pub options: Vec<OptionButtonVm>,
    pub next_enabled: bool,
    pub loading: bool,
    pub error: Option<ViewError>,
}

impl QuestionScreenVm {
    #[must_use]
    pub fn progress_style(&self) -> String {
        format!("width: {:.1}%", self.progress_percent)
    }

    #[must_use]
    pub fn can_retry(&self) -> bool {
        self.error.is_some() && !self.loading
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryItemVm {
    pub number_label: String,
    pub status_label: &'static str,
    pub status_class: &'static str,
    pub prompt: String,
    pub your_answer: String,
    pub correct_answer: String,
    pub explanation: String,
}

impl SummaryItemVm {
    fn from_item(item: &AnswerSummaryItem) -> Self {
        let (status_label, status_class) = if item.is_correct {
            ("Correct", "correct")
        } else {
            ("Incorrect", "wrong")
        };
        Self {
            number_label: format!("#{}", item.number),
            status_label,
            status_class,
            prompt: item.prompt.clone(),
            your_answer: format!("{} ({})", item.selected_text, item.selected_key),
            correct_answer: format!("{} ({})", item.correct_text, item.correct_key),
            explanation: item.explanation.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultScreenVm {
    pub score_label: String,
    pub percentage_label: String,
    pub time_label: String,
    pub passed: bool,
    pub verdict_message: &'static str,
    pub items: Vec<SummaryItemVm>,
    pub restart_label: &'static str,
    pub restart_disabled: bool,
    pub error: Option<ViewError>,
}

impl ResultScreenVm {
    fn from_report(report: &ReportView, busy: bool, error: Option<ViewError>) -> Self {
        let passed = report.verdict == Verdict::Pass;
        Self {
            score_label: format!("{}/{}", report.score, report.total),
            percentage_label: format!("{:.1}%", report.percentage),
            time_label: format!(
                "Time: {}m {:02}s",
                report.elapsed_secs / 60,
                report.elapsed_secs % 60
            ),
            passed,
            verdict_message: if passed { PASS_MESSAGE } else { FAIL_MESSAGE },
            items: report.items.iter().map(SummaryItemVm::from_item).collect(),
            restart_label: if busy { "Loading..." } else { "Restart Quiz" },
            restart_disabled: busy,
            error,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ScreenVm {
    Start(StartScreenVm),
    Question(QuestionScreenVm),
    Result(ResultScreenVm),
}

/// Map an engine snapshot to the screen to paint.
///
/// `in_flight` covers the gap between a click and the engine marking itself busy.
#[must_use]
pub fn map_screen(snapshot: &QuizSnapshot, in_flight: bool) -> ScreenVm {
    let busy = snapshot.busy || in_flight;
    let error = snapshot.notice.map(ViewError::from_failure);

    match (snapshot.screen, snapshot.report.as_ref()) {
        (QuizScreen::Start, _) => ScreenVm::Start(StartScreenVm {
            start_label: if busy { "Loading..." } else { "Start Quiz" },
            start_disabled: busy,
            error,
        }),
        (QuizScreen::Result, Some(report)) => {
            ScreenVm::Result(ResultScreenVm::from_report(report, busy, error))
        }
        (QuizScreen::Question | QuizScreen::Result, _) => {
            ScreenVm::Question(map_question(snapshot, busy, error))
        }
    }
}

fn map_question(
    snapshot: &QuizSnapshot,
    busy: bool,
    error: Option<ViewError>,
) -> QuestionScreenVm {
    let loading = matches!(snapshot.phase, QuizPhase::Loading | QuizPhase::Starting);
    let options = snapshot
        .question
        .as_ref()
        .map(|question| {
            question
                .options
                .iter()
                .map(|option| OptionButtonVm {
                    key: option.key,
                    label: option.text.clone(),
                    class: if option.selected {
                        "option-btn selected"
                    } else {
                        "option-btn"
                    },
                    disabled: busy,
                })
                .collect()
        })
        .unwrap_or_default();

    QuestionScreenVm {
        counter_label: format!("Question {}/{}", snapshot.position + 1, snapshot.total),
        progress_percent: snapshot.progress * 100.0,
        score_label: HIDDEN_SCORE_LABEL,
        prompt: snapshot.question.as_ref().map(|q| q.prompt.clone()),
        options,
        next_enabled: snapshot.next_enabled && !busy,
        loading,
        error: error.filter(|_| snapshot.phase == QuizPhase::LoadFailed),
    }
}
