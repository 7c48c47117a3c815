use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── OPTION KEY ────────────────────────────────────────────────────────────────
//

/// One of the fixed answer slots of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionKey {
    A,
    B,
    C,
}

impl OptionKey {
    /// All keys in display order.
    pub const ALL: [OptionKey; 3] = [OptionKey::A, OptionKey::B, OptionKey::C];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OptionKey::A => "A",
            OptionKey::B => "B",
            OptionKey::C => "C",
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid option key: {raw:?}")]
pub struct ParseOptionKeyError {
    pub raw: String,
}

impl FromStr for OptionKey {
    type Err = ParseOptionKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" => Ok(OptionKey::A),
            "B" => Ok(OptionKey::B),
            "C" => Ok(OptionKey::C),
            _ => Err(ParseOptionKeyError { raw: s.to_string() }),
        }
    }
}

//
// ─── VALIDATION ERRORS ─────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionValidationError {
    #[error("question prompt must not be empty")]
    EmptyPrompt,

    #[error("unknown option key: {0:?}")]
    UnknownOptionKey(String),

    #[error("missing option {0}")]
    MissingOption(OptionKey),

    #[error("option {0} must not be empty")]
    EmptyOption(OptionKey),

    #[error("correct answer {0:?} is not one of the option keys")]
    InvalidCorrectAnswer(String),
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated question as served by the question bank.
///
/// Field names follow the bank's JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub id: QuestionId,
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: BTreeMap<String, String>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionValidationError` when the prompt is blank, an option is unknown,
    /// missing or blank, or the correct answer is not one of the option keys.
    pub fn validate(self) -> Result<Question, QuestionValidationError> {
        if self.prompt.trim().is_empty() {
            return Err(QuestionValidationError::EmptyPrompt);
        }

        let mut options = BTreeMap::new();
        for (raw_key, text) in self.options {
            let key = raw_key
                .parse::<OptionKey>()
                .map_err(|_| QuestionValidationError::UnknownOptionKey(raw_key.clone()))?;
            if text.trim().is_empty() {
                return Err(QuestionValidationError::EmptyOption(key));
            }
            options.insert(key, text);
        }

        if let Some(missing) = OptionKey::ALL
            .into_iter()
            .find(|key| !options.contains_key(key))
        {
            return Err(QuestionValidationError::MissingOption(missing));
        }

        // The bank stores keys with stray whitespace.
        let correct_answer = self
            .correct_answer
            .parse::<OptionKey>()
            .map_err(|_| QuestionValidationError::InvalidCorrectAnswer(self.correct_answer.clone()))?;

        Ok(Question {
            id: self.id,
            prompt: self.prompt,
            options,
            correct_answer,
            explanation: self.explanation,
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A validated multiple-choice question.
///
/// Every key in `OptionKey::ALL` has non-empty text and `correct_answer` is one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: BTreeMap<OptionKey, String>,
    correct_answer: OptionKey,
    explanation: String,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Options in key order.
    pub fn options(&self) -> impl Iterator<Item = (OptionKey, &str)> {
        self.options.iter().map(|(key, text)| (*key, text.as_str()))
    }

    #[must_use]
    pub fn option_text(&self, key: OptionKey) -> Option<&str> {
        self.options.get(&key).map(String::as_str)
    }

    #[must_use]
    pub fn has_option(&self, key: OptionKey) -> bool {
        self.options.contains_key(&key)
    }

    #[must_use]
    pub fn correct_answer(&self) -> OptionKey {
        self.correct_answer
    }

    #[must_use]
    pub fn correct_text(&self) -> &str {
        self.option_text(self.correct_answer).unwrap_or_default()
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn is_correct(&self, key: OptionKey) -> bool {
        key == self.correct_answer
    }

    /// Convert back into the wire shape, e.g. for seeding or export.
    #[must_use]
    pub fn to_draft(&self) -> QuestionDraft {
        QuestionDraft {
            id: self.id.clone(),
            prompt: self.prompt.clone(),
            options: self
                .options
                .iter()
                .map(|(key, text)| (key.as_str().to_string(), text.clone()))
                .collect(),
            correct_answer: self.correct_answer.as_str().to_string(),
            explanation: self.explanation.clone(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
