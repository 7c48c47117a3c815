use std::collections::BTreeMap;
use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use quiz_core::model::{Question, QuestionDraft, QuestionId};
use quiz_core::time::fixed_now;
use services::{Clock, QuestionBankSource, QuestionSource, QuestionSourceError, QuizEngine};
use storage::repository::{InMemoryRepository, QuestionRepository};

use crate::context::{UiApp, build_app_context};
use crate::views::QuizView;

struct TestApp {
    engine: Arc<QuizEngine>,
}

impl UiApp for TestApp {
    fn quiz_engine(&self) -> Arc<QuizEngine> {
        Arc::clone(&self.engine)
    }
}

/// Source whose id list can never be fetched.
pub struct UnreachableSource;

#[async_trait::async_trait]
impl QuestionSource for UnreachableSource {
    async fn start_quiz(&self) -> Result<Vec<QuestionId>, QuestionSourceError> {
        Err(QuestionSourceError::Unavailable("connection refused".into()))
    }

    async fn get_question(&self, id: &QuestionId) -> Result<Question, QuestionSourceError> {
        Err(QuestionSourceError::NotFound(id.clone()))
    }
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewHarnessRoot(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    rsx! { QuizView {} }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn sample_question(id: u64, correct: &str) -> Question {
    QuestionDraft {
        id: QuestionId::from(id),
        prompt: format!("Sample question {id}?"),
        options: BTreeMap::from([
            ("A".to_string(), format!("Answer {id}A")),
            ("B".to_string(), format!("Answer {id}B")),
            ("C".to_string(), format!("Answer {id}C")),
        ]),
        correct_answer: correct.into(),
        explanation: format!("Explanation {id}"),
    }
    .validate()
    .expect("valid sample question")
}

/// Engine over an in-memory bank holding `count` questions, all answered by `A`.
pub async fn bank_engine(count: u64) -> Arc<QuizEngine> {
    let repo = Arc::new(InMemoryRepository::new());
    for id in 1..=count {
        repo.upsert_question(&sample_question(id, "A"))
            .await
            .expect("upsert question");
    }
    let source = QuestionBankSource::new(repo).with_shuffle(false);
    engine_with(Arc::new(source))
}

pub fn engine_with(source: Arc<dyn QuestionSource>) -> Arc<QuizEngine> {
    Arc::new(QuizEngine::new(source, Clock::fixed(fixed_now())))
}

/// Mount `QuizView` over an engine prepared by the caller.
pub fn setup_view_harness(engine: Arc<QuizEngine>) -> ViewHarness {
    let app = Arc::new(TestApp { engine });
    let dom = VirtualDom::new_with_props(ViewHarnessRoot, ViewHarnessProps { app });
    let mut harness = ViewHarness { dom };
    harness.rebuild();
    harness
}
