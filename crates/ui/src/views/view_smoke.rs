use std::sync::Arc;

use quiz_core::model::OptionKey;
use services::QuizPhase;

use super::quiz::apply_selection;
use super::test_harness::{UnreachableSource, bank_engine, engine_with, setup_view_harness};

#[tokio::test(flavor = "current_thread")]
async fn start_screen_renders_start_button() {
    let engine = bank_engine(2).await;
    let harness = setup_view_harness(engine);
    let html = harness.render();
    assert!(html.contains("Start Quiz"), "missing start button in {html}");
    assert!(!html.contains("role=\"alert\""), "unexpected error in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn question_screen_hides_score() {
    let engine = bank_engine(2).await;
    engine.begin_session().await.unwrap();
    engine.select_option(OptionKey::B).unwrap();

    let harness = setup_view_harness(engine);
    let html = harness.render();
    assert!(html.contains("Question 1/2"), "missing counter in {html}");
    assert!(html.contains("Score: Hidden"), "missing hidden score in {html}");
    assert!(html.contains("Sample question 1?"), "missing prompt in {html}");
    assert!(html.contains("Answer 1C"), "missing option in {html}");
    assert!(html.contains("option-btn selected"), "missing selection in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn result_screen_renders_summary() {
    let engine = bank_engine(2).await;
    engine.begin_session().await.unwrap();
    for key in [OptionKey::A, OptionKey::C] {
        engine.select_option(key).unwrap();
        engine.advance().await.unwrap();
    }

    let harness = setup_view_harness(Arc::clone(&engine));
    let html = harness.render();
    assert!(html.contains("1/2"), "missing score in {html}");
    assert!(html.contains("50.0%"), "missing percentage in {html}");
    assert!(html.contains("Time: 0m 00s"), "missing elapsed time in {html}");
    assert!(
        html.contains("Keep practicing. You need 80% to pass."),
        "missing verdict in {html}"
    );
    assert!(html.contains("#2"), "missing item number in {html}");
    assert!(html.contains("Answer 2C (C)"), "missing chosen answer in {html}");
    assert!(html.contains("Answer 2A (A)"), "missing correct answer in {html}");
    assert!(html.contains("Restart Quiz"), "missing restart in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn empty_bank_shows_notice_on_start_screen() {
    let engine = bank_engine(0).await;
    assert!(engine.begin_session().await.is_err());

    let harness = setup_view_harness(engine);
    let html = harness.render();
    assert!(html.contains("No questions available."), "missing notice in {html}");
    assert!(html.contains("Start Quiz"), "missing start button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn unreachable_source_shows_start_failure() {
    let engine = engine_with(Arc::new(UnreachableSource));
    assert!(engine.begin_session().await.is_err());

    let harness = setup_view_harness(engine);
    let html = harness.render();
    assert!(
        html.contains("Failed to start quiz. Please try again."),
        "missing notice in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn rejected_selection_keeps_state() {
    let engine = bank_engine(1).await;
    let before = apply_selection(&engine, OptionKey::A);
    assert_eq!(before.phase, QuizPhase::NotStarted);
    assert!(before.question.is_none());

    engine.begin_session().await.unwrap();
    let selected = apply_selection(&engine, OptionKey::C);
    assert_eq!(selected.phase, QuizPhase::SelectionPending);
    assert!(selected.next_enabled);
}
