use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use quiz_core::model::{
    Advance, OptionKey, QuestionId, QuizReport, QuizSession, SessionPhase, SessionStateError,
};

use super::view::{FailureKind, QuestionView, QuizPhase, QuizScreen, QuizSnapshot, ReportView};
use crate::Clock;
use crate::error::{QuestionSourceError, QuizError};
use crate::source::QuestionSource;

/// Result of a successful `advance()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Nothing was selected; state is unchanged.
    Ignored,
    /// The answer was recorded and the next question is loaded.
    NextQuestion,
    /// The answer was recorded and the session is finished.
    Finished,
}

#[derive(Default)]
struct EngineState {
    /// Bumped when a new session replaces the current one; question loads dispatched
    /// under an older value are stale.
    generation: u64,
    /// Bumped by every `begin_session`; only the latest start may apply its id list.
    start_seq: u64,
    starting: bool,
    loading: bool,
    session: Option<QuizSession>,
    notice: Option<FailureKind>,
}

impl EngineState {
    fn busy(&self) -> bool {
        self.starting || self.loading
    }

    fn record_failure(&mut self, err: &QuizError) {
        warn!("quiz operation failed: {err}");
        self.notice = err.failure_kind();
    }

    /// Mark the current question as loading and return what to fetch.
    fn dispatch_load(&mut self) -> Result<(u64, QuestionId), QuizError> {
        let session = self.session.as_mut().ok_or(QuizError::NotStarted)?;
        let id = session
            .current_question_id()
            .cloned()
            .ok_or(QuizError::Finished)?;
        session.clear_question();
        self.loading = true;
        Ok((self.generation, id))
    }
}

/// Drives a quiz session against a `QuestionSource`.
///
/// All operations take `&self`; the state lock is never held across an `.await`,
/// so the engine can be shared as `Arc<QuizEngine>` by the rendering layer.
pub struct QuizEngine {
    source: Arc<dyn QuestionSource>,
    clock: Clock,
    state: Mutex<EngineState>,
}

impl QuizEngine {
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>, clock: Clock) -> Self {
        Self {
            source,
            clock,
            state: Mutex::new(EngineState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a fresh session, replacing any previous one, and load its first question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestionsAvailable` for an empty id list,
    /// `QuizError::SourceUnavailable` when the list cannot be fetched,
    /// a load error when the first question fails, and `QuizError::Superseded`
    /// when another `begin_session` started meanwhile.
    pub async fn begin_session(&self) -> Result<(), QuizError> {
        let token = {
            let mut state = self.lock();
            state.start_seq += 1;
            state.starting = true;
            state.notice = None;
            state.start_seq
        };
        debug!("starting quiz session (request {token})");

        let fetched = self.source.start_quiz().await;

        let (generation, id) = {
            let mut state = self.lock();
            if state.start_seq != token {
                debug!("discarding stale question list (request {token})");
                return Err(QuizError::Superseded);
            }
            state.starting = false;

            let session = fetched
                .map_err(QuizError::SourceUnavailable)
                .and_then(|ids| {
                    QuizSession::new(ids, self.clock.now()).map_err(QuizError::from)
                });
            let session = match session {
                Ok(session) => session,
                Err(err) => {
                    // The kept session and any load it has in flight stay current.
                    state.record_failure(&err);
                    return Err(err);
                }
            };
            debug!("quiz session has {} questions", session.total());
            state.generation += 1;
            state.session = Some(session);
            state.dispatch_load()?
        };

        self.finish_load(generation, id).await
    }

    /// Fetch the question at the current index, e.g. to retry after a failed load.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Busy` while another fetch is outstanding, `NotStarted` or
    /// `Finished` when there is nothing to load, and `QuestionNotFound` /
    /// `QuestionLoadFailed` when the fetch fails.
    pub async fn load_current_question(&self) -> Result<(), QuizError> {
        let (generation, id) = {
            let mut state = self.lock();
            if state.busy() {
                return Err(QuizError::Busy);
            }
            state.dispatch_load()?
        };
        self.finish_load(generation, id).await
    }

    async fn finish_load(&self, generation: u64, id: QuestionId) -> Result<(), QuizError> {
        debug!("loading question {id}");
        let fetched = self.source.get_question(&id).await;

        let mut guard = self.lock();
        let state = &mut *guard;
        if state.generation != generation {
            debug!("discarding stale question {id} (generation {generation})");
            return Err(QuizError::Superseded);
        }
        state.loading = false;
        let session = state.session.as_mut().ok_or(QuizError::NotStarted)?;

        let installed = fetched
            .map_err(|source| QuizError::from_load_failure(id.clone(), source))
            .and_then(|question| {
                session.install_question(question).map_err(|err| match err {
                    SessionStateError::QuestionMismatch { .. } => QuizError::QuestionLoadFailed {
                        id: id.clone(),
                        source: QuestionSourceError::Malformed(err.to_string()),
                    },
                    other => other.into(),
                })
            });

        match installed {
            Ok(()) => {
                state.notice = None;
                Ok(())
            }
            Err(err) => {
                session.clear_question();
                state.record_failure(&err);
                Err(err)
            }
        }
    }

    /// Record `key` as the pending selection, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Busy`, `NotStarted`, `NoQuestionLoaded`, `Finished` or
    /// `InvalidOption` when the selection cannot apply.
    pub fn select_option(&self, key: OptionKey) -> Result<(), QuizError> {
        let mut state = self.lock();
        if state.busy() {
            return Err(QuizError::Busy);
        }
        let session = state.session.as_mut().ok_or(QuizError::NotStarted)?;
        session.select(key)?;
        Ok(())
    }

    /// Commit the pending selection and move on.
    ///
    /// Without a pending selection this is a no-op returning `AdvanceOutcome::Ignored`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Busy` while a fetch is outstanding, `NotStarted` without a
    /// session, and a load error if the next question cannot be fetched.
    pub async fn advance(&self) -> Result<AdvanceOutcome, QuizError> {
        let (generation, id) = {
            let mut guard = self.lock();
            if guard.busy() {
                return Err(QuizError::Busy);
            }
            let state = &mut *guard;
            let session = state.session.as_mut().ok_or(QuizError::NotStarted)?;
            match session.commit(self.clock.now()) {
                None => {
                    debug!("advance ignored: nothing selected");
                    return Ok(AdvanceOutcome::Ignored);
                }
                Some(Advance::Finished) => {
                    debug!(
                        "quiz finished with score {}/{}",
                        session.score(),
                        session.total()
                    );
                    return Ok(AdvanceOutcome::Finished);
                }
                Some(Advance::NextQuestion) => {}
            }
            state.dispatch_load()?
        };

        self.finish_load(generation, id).await?;
        Ok(AdvanceOutcome::NextQuestion)
    }

    /// Final report of a finished session. Pure; repeated calls return equal reports.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotStarted` or `QuizError::NotFinished`.
    pub fn build_report(&self) -> Result<QuizReport, QuizError> {
        let state = self.lock();
        let session = state.session.as_ref().ok_or(QuizError::NotStarted)?;
        Ok(session.report()?)
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.lock().busy()
    }

    /// Current state for the rendering layer.
    #[must_use]
    pub fn snapshot(&self) -> QuizSnapshot {
        let state = self.lock();
        let busy = state.busy();
        let starting = state.starting;

        let Some(session) = state.session.as_ref() else {
            return QuizSnapshot {
                phase: if starting {
                    QuizPhase::Starting
                } else {
                    QuizPhase::NotStarted
                },
                busy,
                notice: state.notice,
                ..QuizSnapshot::not_started()
            };
        };

        let phase = if starting {
            QuizPhase::Starting
        } else {
            match session.phase() {
                SessionPhase::AwaitingQuestion if state.loading => QuizPhase::Loading,
                SessionPhase::AwaitingQuestion => QuizPhase::LoadFailed,
                SessionPhase::AwaitingSelection => QuizPhase::AwaitingSelection,
                SessionPhase::SelectionPending => QuizPhase::SelectionPending,
                SessionPhase::Finished => QuizPhase::Finished,
            }
        };
        let screen = if session.is_finished() {
            QuizScreen::Result
        } else {
            QuizScreen::Question
        };

        QuizSnapshot {
            phase,
            screen,
            busy,
            position: session.current_index(),
            total: session.total(),
            progress: session.progress(),
            score: session.score(),
            question: session
                .current_question()
                .map(|question| QuestionView::from_question(question, session.pending())),
            next_enabled: phase == QuizPhase::SelectionPending && !busy,
            notice: state.notice,
            report: session
                .report()
                .ok()
                .map(|report| ReportView::from_report(&report)),
        }
    }
}
