use quiz_core::model::{Question, QuestionId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{map_question_row, question_id_from_text};
use crate::repository::{QuestionRecord, QuestionRepository, StorageError};

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let record = QuestionRecord::from_question(question);

        sqlx::query(
            r"
            INSERT INTO questions (id, prompt, option_a, option_b, option_c, correct_answer, explanation)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                prompt = excluded.prompt,
                option_a = excluded.option_a,
                option_b = excluded.option_b,
                option_c = excluded.option_c,
                correct_answer = excluded.correct_answer,
                explanation = excluded.explanation
            ",
        )
        .bind(record.id.as_str())
        .bind(record.prompt)
        .bind(record.option_a)
        .bind(record.option_b)
        .bind(record.option_c)
        .bind(record.correct_answer)
        .bind(record.explanation)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_question(&self, id: &QuestionId) -> Result<Option<Question>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, prompt, option_a, option_b, option_c, correct_answer, explanation
            FROM questions WHERE id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_question_row).transpose()
    }

    async fn list_question_ids(&self) -> Result<Vec<QuestionId>, StorageError> {
        let rows = sqlx::query("SELECT id FROM questions ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            let raw: String = row
                .try_get("id")
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            ids.push(question_id_from_text(raw)?);
        }
        Ok(ids)
    }

    async fn count_questions(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        u64::try_from(count).map_err(|_| StorageError::Serialization("count sign overflow".into()))
    }
}
