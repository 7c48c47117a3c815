use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quiz_core::model::{OptionKey, Question, QuestionDraft, QuestionId, Verdict};
use quiz_core::time::fixed_now;
use services::{
    AdvanceOutcome, Clock, FailureKind, QuestionSource, QuestionSourceError, QuizEngine,
    QuizError, QuizPhase, QuizScreen,
};
use tokio::sync::oneshot;

/// Question source driven by a script of id lists and a fixed question table.
#[derive(Default)]
struct ScriptedSource {
    lists: Mutex<VecDeque<Result<Vec<QuestionId>, QuestionSourceError>>>,
    questions: Mutex<HashMap<QuestionId, Question>>,
    broken: Mutex<HashSet<QuestionId>>,
    list_gate: Mutex<Option<oneshot::Receiver<()>>>,
    question_gates: Mutex<HashMap<QuestionId, oneshot::Receiver<()>>>,
    start_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl ScriptedSource {
    fn push_list(&self, ids: &[&str]) {
        self.lists
            .lock()
            .unwrap()
            .push_back(Ok(ids.iter().map(|id| qid(id)).collect()));
    }

    fn push_failure(&self) {
        self.lists
            .lock()
            .unwrap()
            .push_back(Err(QuestionSourceError::Unavailable("connection refused".into())));
    }

    fn add(&self, id: &str, correct: &str) {
        self.questions
            .lock()
            .unwrap()
            .insert(qid(id), question(id, correct));
    }

    fn break_question(&self, id: &str) {
        self.broken.lock().unwrap().insert(qid(id));
    }

    fn repair_question(&self, id: &str) {
        self.broken.lock().unwrap().remove(&qid(id));
    }

    fn gate_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.list_gate.lock().unwrap() = Some(rx);
        tx
    }

    fn gate_question(&self, id: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.question_gates.lock().unwrap().insert(qid(id), rx);
        tx
    }
}

#[async_trait]
impl QuestionSource for ScriptedSource {
    async fn start_quiz(&self) -> Result<Vec<QuestionId>, QuestionSourceError> {
        let gate = self.list_gate.lock().unwrap().take();
        let next = self
            .lists
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(QuestionSourceError::Unavailable("script exhausted".into())));
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        next
    }

    async fn get_question(&self, id: &QuestionId) -> Result<Question, QuestionSourceError> {
        let gate = self.question_gates.lock().unwrap().remove(id);
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.broken.lock().unwrap().contains(id) {
            return Err(QuestionSourceError::Malformed("truncated body".into()));
        }
        self.questions
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| QuestionSourceError::NotFound(id.clone()))
    }
}

fn qid(raw: &str) -> QuestionId {
    QuestionId::new(raw).unwrap()
}

fn question(id: &str, correct: &str) -> Question {
    QuestionDraft {
        id: qid(id),
        prompt: format!("Question {id}"),
        options: BTreeMap::from([
            ("A".to_string(), format!("{id}-a")),
            ("B".to_string(), format!("{id}-b")),
            ("C".to_string(), format!("{id}-c")),
        ]),
        correct_answer: correct.into(),
        explanation: format!("Explanation {id}"),
    }
    .validate()
    .unwrap()
}

/// Source with questions `ids`, all answered correctly by `A`.
fn source_with(ids: &[&str]) -> Arc<ScriptedSource> {
    let source = Arc::new(ScriptedSource::default());
    for id in ids {
        source.add(id, "A");
    }
    source.push_list(ids);
    source
}

fn engine(source: &Arc<ScriptedSource>) -> Arc<QuizEngine> {
    Arc::new(QuizEngine::new(
        Arc::clone(source) as Arc<dyn QuestionSource>,
        Clock::fixed(fixed_now()),
    ))
}

async fn answer(engine: &QuizEngine, key: OptionKey) -> AdvanceOutcome {
    engine.select_option(key).unwrap();
    let outcome = engine.advance().await.unwrap();
    let snapshot = engine.snapshot();
    if let Ok(report) = engine.build_report() {
        assert_eq!(report.answers().len(), snapshot.position);
    }
    outcome
}

async fn wait_for(counter: &AtomicUsize, at_least: usize) {
    while counter.load(Ordering::SeqCst) < at_least {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn four_of_five_passes_at_the_boundary() {
    let source = source_with(&["1", "2", "3", "4", "5"]);
    let engine = engine(&source);
    engine.begin_session().await.unwrap();

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.phase, QuizPhase::AwaitingSelection);
    assert_eq!(snapshot.screen, QuizScreen::Question);
    assert_eq!(snapshot.total, 5);
    assert!(!snapshot.next_enabled);

    let keys = [OptionKey::A, OptionKey::A, OptionKey::B, OptionKey::A, OptionKey::A];
    for (index, key) in keys.into_iter().enumerate() {
        let outcome = answer(&engine, key).await;
        if index < 4 {
            assert_eq!(outcome, AdvanceOutcome::NextQuestion);
            assert_eq!(engine.snapshot().position, index + 1);
        } else {
            assert_eq!(outcome, AdvanceOutcome::Finished);
        }
    }

    let report = engine.build_report().unwrap();
    assert_eq!(report.score(), 4);
    assert_eq!(report.total(), 5);
    assert!((report.percentage() - 80.0).abs() < f64::EPSILON);
    assert_eq!(report.verdict(), Verdict::Pass);

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.phase, QuizPhase::Finished);
    assert_eq!(snapshot.screen, QuizScreen::Result);
    let view = snapshot.report.expect("report view");
    assert_eq!(view.items.len(), 5);
    assert!(!view.items[2].is_correct);
    assert_eq!(view.items[2].selected_text, "3-b");
    assert_eq!(view.items[2].correct_text, "3-a");
}

#[tokio::test]
async fn two_of_three_fails() {
    let source = source_with(&["1", "2", "3"]);
    let engine = engine(&source);
    engine.begin_session().await.unwrap();

    for key in [OptionKey::A, OptionKey::C, OptionKey::A] {
        answer(&engine, key).await;
    }

    let report = engine.build_report().unwrap();
    assert_eq!(report.score(), 2);
    assert_eq!(format!("{:.1}", report.percentage()), "66.7");
    assert_eq!(report.verdict(), Verdict::Fail);
}

#[tokio::test]
async fn progress_is_computed_before_increment() {
    let source = source_with(&["1", "2", "3", "4"]);
    let engine = engine(&source);
    engine.begin_session().await.unwrap();
    assert!(engine.snapshot().progress.abs() < f64::EPSILON);

    answer(&engine, OptionKey::A).await;
    let snapshot = engine.snapshot();
    assert!((snapshot.progress - 0.25).abs() < f64::EPSILON);
    assert_eq!(snapshot.score, 1);
    assert_eq!(snapshot.question.unwrap().id, qid("2"));
}

#[tokio::test]
async fn empty_id_list_keeps_start_screen() {
    let source = Arc::new(ScriptedSource::default());
    source.push_list(&[]);
    let engine = engine(&source);

    let err = engine.begin_session().await.unwrap_err();
    assert!(matches!(err, QuizError::NoQuestionsAvailable));

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.phase, QuizPhase::NotStarted);
    assert_eq!(snapshot.screen, QuizScreen::Start);
    assert_eq!(snapshot.notice, Some(FailureKind::NoQuestionsAvailable));
    assert!(!snapshot.busy);
    assert!(matches!(engine.build_report(), Err(QuizError::NotStarted)));
}

#[tokio::test]
async fn unreachable_source_keeps_start_screen() {
    let source = Arc::new(ScriptedSource::default());
    source.push_failure();
    let engine = engine(&source);

    let err = engine.begin_session().await.unwrap_err();
    assert!(matches!(err, QuizError::SourceUnavailable(_)));
    assert_eq!(err.failure_kind(), Some(FailureKind::SourceUnavailable));
    assert_eq!(engine.snapshot().screen, QuizScreen::Start);
}

#[tokio::test]
async fn failed_restart_keeps_previous_result() {
    let source = source_with(&["1"]);
    let engine = engine(&source);
    engine.begin_session().await.unwrap();
    answer(&engine, OptionKey::A).await;

    source.push_failure();
    assert!(engine.begin_session().await.is_err());

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.screen, QuizScreen::Result);
    assert_eq!(snapshot.notice, Some(FailureKind::SourceUnavailable));
    assert_eq!(engine.build_report().unwrap().score(), 1);
}

#[tokio::test]
async fn failed_load_blocks_selection_until_reload() {
    let source = source_with(&["1", "2"]);
    source.break_question("2");
    let engine = engine(&source);
    engine.begin_session().await.unwrap();

    engine.select_option(OptionKey::A).unwrap();
    let err = engine.advance().await.unwrap_err();
    assert!(matches!(err, QuizError::QuestionLoadFailed { .. }));

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.phase, QuizPhase::LoadFailed);
    assert_eq!(snapshot.notice, Some(FailureKind::QuestionLoadFailed));
    assert!(snapshot.question.is_none());
    assert!(!snapshot.next_enabled);
    assert_eq!(snapshot.position, 1);
    assert_eq!(snapshot.score, 1);

    assert!(matches!(
        engine.select_option(OptionKey::B),
        Err(QuizError::NoQuestionLoaded)
    ));
    assert_eq!(engine.advance().await.unwrap(), AdvanceOutcome::Ignored);
    assert_eq!(engine.snapshot().position, 1);

    source.repair_question("2");
    engine.load_current_question().await.unwrap();
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.phase, QuizPhase::AwaitingSelection);
    assert_eq!(snapshot.notice, None);
    assert_eq!(answer(&engine, OptionKey::A).await, AdvanceOutcome::Finished);
    assert_eq!(engine.build_report().unwrap().score(), 2);
}

#[tokio::test]
async fn missing_question_is_reported_as_not_found() {
    let source = Arc::new(ScriptedSource::default());
    source.push_list(&["ghost"]);
    let engine = engine(&source);

    let err = engine.begin_session().await.unwrap_err();
    assert!(matches!(err, QuizError::QuestionNotFound { ref id } if id.as_str() == "ghost"));
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.screen, QuizScreen::Question);
    assert_eq!(snapshot.phase, QuizPhase::LoadFailed);
    assert_eq!(snapshot.notice, Some(FailureKind::QuestionNotFound));
}

#[tokio::test]
async fn advance_without_selection_is_noop() {
    let source = source_with(&["1", "2"]);
    let engine = engine(&source);
    engine.begin_session().await.unwrap();
    let before = engine.snapshot();

    assert_eq!(engine.advance().await.unwrap(), AdvanceOutcome::Ignored);
    assert_eq!(engine.snapshot(), before);
    assert_eq!(source.fetch_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn only_last_selection_counts() {
    let source = source_with(&["1"]);
    let engine = engine(&source);
    engine.begin_session().await.unwrap();

    engine.select_option(OptionKey::B).unwrap();
    engine.select_option(OptionKey::C).unwrap();
    engine.select_option(OptionKey::A).unwrap();
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.phase, QuizPhase::SelectionPending);
    assert!(snapshot.next_enabled);
    let selected: Vec<_> = snapshot
        .question
        .unwrap()
        .options
        .iter()
        .filter(|o| o.selected)
        .map(|o| o.key)
        .collect();
    assert_eq!(selected, vec![OptionKey::A]);

    engine.advance().await.unwrap();
    let report = engine.build_report().unwrap();
    assert_eq!(report.answers()[0].selected(), OptionKey::A);
    assert_eq!(report.score(), 1);
}

#[tokio::test]
async fn restart_discards_previous_session() {
    let source = source_with(&["1", "2"]);
    let engine = engine(&source);
    engine.begin_session().await.unwrap();
    answer(&engine, OptionKey::A).await;
    answer(&engine, OptionKey::A).await;
    assert_eq!(engine.snapshot().screen, QuizScreen::Result);

    source.push_list(&["2", "1"]);
    engine.begin_session().await.unwrap();

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.screen, QuizScreen::Question);
    assert_eq!(snapshot.position, 0);
    assert_eq!(snapshot.score, 0);
    assert!(snapshot.report.is_none());
    assert_eq!(snapshot.question.unwrap().id, qid("2"));
    assert!(matches!(engine.build_report(), Err(QuizError::NotFinished)));
}

#[tokio::test]
async fn report_is_repeatable() {
    let source = source_with(&["1", "2"]);
    let engine = engine(&source);
    engine.begin_session().await.unwrap();
    answer(&engine, OptionKey::A).await;
    assert!(matches!(engine.build_report(), Err(QuizError::NotFinished)));
    answer(&engine, OptionKey::C).await;

    let first = engine.build_report().unwrap();
    let second = engine.build_report().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.completed_at(), fixed_now());
}

#[tokio::test]
async fn operations_are_rejected_while_loading() {
    let source = source_with(&["1", "2"]);
    let release = source.gate_question("2");
    let engine = engine(&source);
    engine.begin_session().await.unwrap();
    engine.select_option(OptionKey::A).unwrap();

    let pending = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.advance().await }
    });
    wait_for(&source.fetch_calls, 2).await;

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.phase, QuizPhase::Loading);
    assert!(snapshot.busy);
    assert!(!snapshot.next_enabled);
    assert!(matches!(engine.select_option(OptionKey::A), Err(QuizError::Busy)));
    assert!(matches!(engine.advance().await, Err(QuizError::Busy)));
    assert!(matches!(engine.load_current_question().await, Err(QuizError::Busy)));

    release.send(()).unwrap();
    assert_eq!(pending.await.unwrap().unwrap(), AdvanceOutcome::NextQuestion);
    assert!(!engine.is_busy());
    assert_eq!(engine.snapshot().phase, QuizPhase::AwaitingSelection);
}

#[tokio::test]
async fn stale_id_list_is_discarded() {
    let source = Arc::new(ScriptedSource::default());
    source.add("old", "A");
    source.add("new", "B");
    source.push_list(&["old"]);
    source.push_list(&["new"]);
    let release = source.gate_list();
    let engine = engine(&source);

    let first = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.begin_session().await }
    });
    wait_for(&source.start_calls, 1).await;
    assert_eq!(engine.snapshot().phase, QuizPhase::Starting);

    engine.begin_session().await.unwrap();
    release.send(()).unwrap();
    assert!(matches!(first.await.unwrap(), Err(QuizError::Superseded)));

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.question.unwrap().id, qid("new"));
    assert_eq!(snapshot.total, 1);
    assert!(!snapshot.busy);
}

#[tokio::test]
async fn stale_question_is_discarded() {
    let source = Arc::new(ScriptedSource::default());
    source.add("old", "A");
    source.add("new", "B");
    source.push_list(&["old"]);
    source.push_list(&["new"]);
    let release = source.gate_question("old");
    let engine = engine(&source);

    let first = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.begin_session().await }
    });
    wait_for(&source.fetch_calls, 1).await;

    engine.begin_session().await.unwrap();
    release.send(()).unwrap();
    assert!(matches!(first.await.unwrap(), Err(QuizError::Superseded)));

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.phase, QuizPhase::AwaitingSelection);
    assert_eq!(snapshot.question.unwrap().id, qid("new"));
    assert!(!snapshot.busy);
}

#[tokio::test]
async fn failed_restart_keeps_in_flight_question_load() {
    let source = source_with(&["1", "2"]);
    let release = source.gate_question("2");
    let engine = engine(&source);
    engine.begin_session().await.unwrap();
    engine.select_option(OptionKey::A).unwrap();

    let pending = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.advance().await }
    });
    wait_for(&source.fetch_calls, 2).await;

    source.push_list(&[]);
    let err = engine.begin_session().await.unwrap_err();
    assert!(matches!(err, QuizError::NoQuestionsAvailable));
    assert!(engine.is_busy());

    release.send(()).unwrap();
    assert_eq!(pending.await.unwrap().unwrap(), AdvanceOutcome::NextQuestion);

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.phase, QuizPhase::AwaitingSelection);
    assert_eq!(snapshot.screen, QuizScreen::Question);
    assert_eq!(snapshot.position, 1);
    assert_eq!(snapshot.question.unwrap().id, qid("2"));
    assert!(!snapshot.busy);
    engine.select_option(OptionKey::B).unwrap();
    assert_eq!(engine.advance().await.unwrap(), AdvanceOutcome::Finished);
    assert_eq!(engine.build_report().unwrap().score(), 1);
}
