use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::model::answer::AnsweredQuestion;

/// Minimum share of correct answers needed to pass.
pub const PASS_THRESHOLD: f64 = 0.80;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReportError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("too many answers for a single quiz: {len}")]
    TooManyAnswers { len: usize },
}

/// Pass/fail outcome of a finished quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// Pass iff `score / total >= PASS_THRESHOLD`, using real division.
    ///
    /// An empty quiz never passes.
    #[must_use]
    pub fn from_score(score: u32, total: u32) -> Self {
        if total == 0 {
            return Verdict::Fail;
        }
        if f64::from(score) / f64::from(total) >= PASS_THRESHOLD {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    #[must_use]
    pub fn is_pass(self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

/// Final summary for a finished quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizReport {
    score: u32,
    total: u32,
    verdict: Verdict,
    answers: Vec<AnsweredQuestion>,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl QuizReport {
    /// Build a report from the ordered answer history.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `ReportError::TooManyAnswers` if the answer count cannot fit in `u32`.
    pub fn from_answers(
        answers: Vec<AnsweredQuestion>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, ReportError> {
        if completed_at < started_at {
            return Err(ReportError::InvalidTimeRange);
        }

        let total = u32::try_from(answers.len())
            .map_err(|_| ReportError::TooManyAnswers { len: answers.len() })?;
        let mut score = 0_u32;
        for answer in &answers {
            if answer.is_correct() {
                score = score.saturating_add(1);
            }
        }

        Ok(Self {
            score,
            total,
            verdict: Verdict::from_score(score, total),
            answers,
            started_at,
            completed_at,
        })
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.total - self.score
    }

    #[must_use]
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Score as a percentage in `[0, 100]`, not rounded.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.score) / f64::from(self.total) * 100.0
    }

    /// Answers in question order.
    #[must_use]
    pub fn answers(&self) -> &[AnsweredQuestion] {
        &self.answers
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.completed_at - self.started_at
    }
}
