use std::sync::Arc;

use services::QuizEngine;

/// What the composition root must hand to the UI.
pub trait UiApp: Send + Sync {
    fn quiz_engine(&self) -> Arc<QuizEngine>;
}

#[derive(Clone)]
pub struct AppContext {
    quiz_engine: Arc<QuizEngine>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            quiz_engine: app.quiz_engine(),
        }
    }

    #[must_use]
    pub fn quiz_engine(&self) -> Arc<QuizEngine> {
        Arc::clone(&self.quiz_engine)
    }
}

// This context is provided by the application composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
