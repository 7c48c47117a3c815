use async_trait::async_trait;
use quiz_core::model::{OptionKey, Question, QuestionDraft, QuestionId, QuestionValidationError};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape for a question: one column per option.
///
/// Mirrors the domain `Question` so repositories can store rows without
/// leaking storage concerns into the domain layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub prompt: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub correct_answer: String,
    pub explanation: String,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        let text = |key| question.option_text(key).unwrap_or_default().to_owned();
        Self {
            id: question.id().clone(),
            prompt: question.prompt().to_owned(),
            option_a: text(OptionKey::A),
            option_b: text(OptionKey::B),
            option_c: text(OptionKey::C),
            correct_answer: question.correct_answer().as_str().to_owned(),
            explanation: question.explanation().to_owned(),
        }
    }

    /// Convert the record back into a domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionValidationError` if the stored row no longer forms a valid question.
    pub fn into_question(self) -> Result<Question, QuestionValidationError> {
        QuestionDraft {
            id: self.id,
            prompt: self.prompt,
            options: BTreeMap::from([
                ("A".to_string(), self.option_a),
                ("B".to_string(), self.option_b),
                ("C".to_string(), self.option_c),
            ]),
            correct_answer: self.correct_answer,
            explanation: self.explanation,
        }
        .validate()
    }

    /// Rows with the same options and correct answer are treated as the same question.
    #[must_use]
    pub fn content_key(&self) -> (&str, &str, &str, &str) {
        (
            self.option_a.as_str(),
            self.option_b.as_str(),
            self.option_c.as_str(),
            self.correct_answer.trim(),
        )
    }
}

/// Repository contract for the local question bank.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Persist or replace a question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError>;

    /// Fetch a question by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures or unreadable rows.
    async fn get_question(&self, id: &QuestionId) -> Result<Option<Question>, StorageError>;

    /// List every question id in a stable order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_question_ids(&self) -> Result<Vec<QuestionId>, StorageError>;

    /// Number of questions in the bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn count_questions(&self) -> Result<u64, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<BTreeMap<QuestionId, Question>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            questions: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(question.id().clone(), question.clone());
        Ok(())
    }

    async fn get_question(&self, id: &QuestionId) -> Result<Option<Question>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(id).cloned())
    }

    async fn list_question_ids(&self) -> Result<Vec<QuestionId>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.keys().cloned().collect())
    }

    async fn count_questions(&self) -> Result<u64, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.len() as u64)
    }
}

/// Groups records that share the same options and correct answer.
///
/// Returns only groups with more than one member, each in input order.
#[must_use]
pub fn find_duplicates(records: &[QuestionRecord]) -> Vec<Vec<&QuestionRecord>> {
    let mut order = Vec::new();
    let mut groups: HashMap<_, Vec<&QuestionRecord>> = HashMap::new();
    for record in records {
        let key = record.content_key();
        let group = groups.entry(key).or_default();
        if group.is_empty() {
            order.push(key);
        }
        group.push(record);
    }

    order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .filter(|group| group.len() > 1)
        .collect()
}

/// Bundles the question repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let questions: Arc<dyn QuestionRepository> = Arc::new(InMemoryRepository::new());
        Self { questions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, options: [&str; 3], correct: &str) -> Question {
        QuestionDraft {
            id: QuestionId::new(id).unwrap(),
            prompt: format!("Prompt {id}"),
            options: BTreeMap::from([
                ("A".to_string(), options[0].to_string()),
                ("B".to_string(), options[1].to_string()),
                ("C".to_string(), options[2].to_string()),
            ]),
            correct_answer: correct.into(),
            explanation: "why".into(),
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn round_trips_question() {
        let repo = InMemoryRepository::new();
        let q = question("7", ["a", "b", "c"], "B");
        repo.upsert_question(&q).await.unwrap();

        let fetched = repo.get_question(q.id()).await.unwrap();
        assert_eq!(fetched, Some(q));
        assert_eq!(repo.count_questions().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_question_is_none() {
        let repo = InMemoryRepository::new();
        let id = QuestionId::new("nope").unwrap();
        assert_eq!(repo.get_question(&id).await.unwrap(), None);
        assert!(repo.list_question_ids().await.unwrap().is_empty());
    }

    #[test]
    fn record_round_trips_through_domain() {
        let q = question("1", ["x", "y", "z"], "C");
        let record = QuestionRecord::from_question(&q);
        assert_eq!(record.option_b, "y");
        assert_eq!(record.correct_answer, "C");
        assert_eq!(record.into_question().unwrap(), q);
    }

    #[test]
    fn duplicates_group_by_options_and_answer() {
        let records = vec![
            QuestionRecord::from_question(&question("1", ["x", "y", "z"], "A")),
            QuestionRecord::from_question(&question("2", ["x", "y", "z"], "B")),
            QuestionRecord::from_question(&question("3", ["x", "y", "z"], "A")),
            QuestionRecord::from_question(&question("4", ["p", "q", "r"], "A")),
        ];
        let groups = find_duplicates(&records);
        assert_eq!(groups.len(), 1);
        let ids: Vec<_> = groups[0].iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }
}
