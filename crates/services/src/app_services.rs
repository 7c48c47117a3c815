use std::sync::Arc;
use std::time::Duration;

use log::info;
use storage::repository::Storage;

use crate::Clock;
use crate::config::{QuestionSourceConfig, SourceKind};
use crate::error::AppServicesError;
use crate::quiz::QuizEngine;
use crate::source::{HttpQuestionSource, QuestionBankSource, QuestionSource};

/// Assembles the quiz engine on top of the configured question source.
#[derive(Clone)]
pub struct AppServices {
    source_kind: SourceKind,
    quiz_engine: Arc<QuizEngine>,
}

impl AppServices {
    /// Build services for whichever source `config` selects.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the source cannot be initialized.
    pub async fn from_config(
        config: &QuestionSourceConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        match config.kind {
            SourceKind::Http => Self::new_http(&config.api_url, config.http_timeout, clock),
            SourceKind::Local => {
                Self::new_sqlite(&config.db_url, config.session_size, clock).await
            }
        }
    }

    /// Build services backed by a remote question bank.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Source` if the base URL or HTTP client is unusable.
    pub fn new_http(
        api_url: &str,
        timeout: Duration,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        info!("using question bank at {api_url}");
        let source = HttpQuestionSource::new(api_url, timeout)?;
        Ok(Self::with_source(SourceKind::Http, Arc::new(source), clock))
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Sqlite` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        session_size: usize,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        info!("using local question bank {db_url}");
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, session_size, clock))
    }

    /// Build services over an already opened storage bundle.
    #[must_use]
    pub fn from_storage(storage: &Storage, session_size: usize, clock: Clock) -> Self {
        let source = QuestionBankSource::new(Arc::clone(&storage.questions))
            .with_session_size(session_size);
        Self::with_source(SourceKind::Local, Arc::new(source), clock)
    }

    #[must_use]
    pub fn with_source(
        source_kind: SourceKind,
        source: Arc<dyn QuestionSource>,
        clock: Clock,
    ) -> Self {
        Self {
            source_kind,
            quiz_engine: Arc::new(QuizEngine::new(source, clock)),
        }
    }

    #[must_use]
    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    #[must_use]
    pub fn quiz_engine(&self) -> Arc<QuizEngine> {
        Arc::clone(&self.quiz_engine)
    }
}
