use quiz_core::model::{Question, QuestionId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{QuestionRecord, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn question_id_from_text(raw: String) -> Result<QuestionId, StorageError> {
    QuestionId::new(raw).map_err(ser)
}

pub(crate) fn map_question_record(row: &SqliteRow) -> Result<QuestionRecord, StorageError> {
    Ok(QuestionRecord {
        id: question_id_from_text(row.try_get::<String, _>("id").map_err(ser)?)?,
        prompt: row.try_get("prompt").map_err(ser)?,
        option_a: row.try_get("option_a").map_err(ser)?,
        option_b: row.try_get("option_b").map_err(ser)?,
        option_c: row.try_get("option_c").map_err(ser)?,
        correct_answer: row.try_get("correct_answer").map_err(ser)?,
        explanation: row.try_get("explanation").map_err(ser)?,
    })
}

/// Reads a row and re-validates it as a domain `Question`.
pub(crate) fn map_question_row(row: &SqliteRow) -> Result<Question, StorageError> {
    map_question_record(row)?.into_question().map_err(ser)
}
