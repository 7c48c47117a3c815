use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use quiz_core::model::{Question, QuestionDraft, QuestionId};

use super::{QuestionSource, QuestionSourceError};

/// Question bank reached over HTTP.
///
/// Endpoints:
/// - `GET {base}/api/start_quiz` returns a JSON array of ids
/// - `GET {base}/api/question/{id}` returns a single question
#[derive(Clone, Debug)]
pub struct HttpQuestionSource {
    client: Client,
    base_url: Url,
}

impl HttpQuestionSource {
    /// Build a source for the bank at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError::Unavailable` when the URL cannot serve as a base,
    /// or `QuestionSourceError::Http` when the client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, QuestionSourceError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            QuestionSourceError::Unavailable(format!("invalid base url {base_url:?}: {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(QuestionSourceError::Unavailable(format!(
                "base url cannot carry a path: {base_url}"
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, QuestionSourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                QuestionSourceError::Unavailable(format!(
                    "base url cannot carry a path: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch(&self, url: Url) -> Result<(StatusCode, Vec<u8>), QuestionSourceError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok((status, body.to_vec()))
    }
}

fn parse_id_list(body: &[u8]) -> Result<Vec<QuestionId>, QuestionSourceError> {
    serde_json::from_slice(body)
        .map_err(|e| QuestionSourceError::Malformed(format!("question id list: {e}")))
}

fn parse_question(expected: &QuestionId, body: &[u8]) -> Result<Question, QuestionSourceError> {
    let draft: QuestionDraft = serde_json::from_slice(body)
        .map_err(|e| QuestionSourceError::Malformed(format!("question {expected}: {e}")))?;
    if draft.id != *expected {
        return Err(QuestionSourceError::Malformed(format!(
            "requested question {expected}, received {}",
            draft.id
        )));
    }
    Ok(draft.validate()?)
}

#[async_trait]
impl QuestionSource for HttpQuestionSource {
    async fn start_quiz(&self) -> Result<Vec<QuestionId>, QuestionSourceError> {
        let url = self.endpoint(&["api", "start_quiz"])?;
        let (status, body) = self.fetch(url).await?;
        if !status.is_success() {
            return Err(QuestionSourceError::HttpStatus(status));
        }
        parse_id_list(&body)
    }

    async fn get_question(&self, id: &QuestionId) -> Result<Question, QuestionSourceError> {
        let url = self.endpoint(&["api", "question", id.as_str()])?;
        let (status, body) = self.fetch(url).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(QuestionSourceError::NotFound(id.clone()));
        }
        if !status.is_success() {
            return Err(QuestionSourceError::HttpStatus(status));
        }
        parse_question(id, &body)
    }
}
