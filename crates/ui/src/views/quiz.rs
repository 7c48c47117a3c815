use std::sync::Arc;

use dioxus::prelude::*;
use log::debug;
use quiz_core::model::OptionKey;
use services::{QuizEngine, QuizSnapshot};

use crate::context::AppContext;
use crate::vm::{
    OptionButtonVm, QuestionScreenVm, QuizIntent, ResultScreenVm, ScreenVm, StartScreenVm,
    map_screen,
};

#[component]
pub fn QuizView() -> Element {
    let ctx = use_context::<AppContext>();
    let engine = ctx.quiz_engine();
    let snapshot = use_signal({
        let engine = Arc::clone(&engine);
        move || engine.snapshot()
    });
    let in_flight = use_signal(|| 0_u32);

    let dispatch = use_callback(move |intent: QuizIntent| {
        let engine = Arc::clone(&engine);
        let mut snapshot = snapshot;
        let mut in_flight = in_flight;

        if let QuizIntent::Select(key) = intent {
            snapshot.set(apply_selection(&engine, key));
            return;
        }

        in_flight += 1;
        spawn(async move {
            // Failures reach the screen through the snapshot notice.
            let _ = match intent {
                QuizIntent::Start => engine.begin_session().await,
                QuizIntent::Next => engine.advance().await.map(|_| ()),
                QuizIntent::Retry => engine.load_current_question().await,
                QuizIntent::Select(_) => Ok(()),
            };
            in_flight -= 1;
            snapshot.set(engine.snapshot());
        });
    });

    let on_key = move |evt: KeyboardEvent| {
        let (has_question, next_enabled) = {
            let current = snapshot.read();
            (current.question.is_some(), current.next_enabled)
        };
        match evt.data.key() {
            Key::Enter if next_enabled => {
                evt.prevent_default();
                dispatch.call(QuizIntent::Next);
            }
            Key::Character(value) if has_question => {
                if let Ok(key) = value.to_ascii_uppercase().parse::<OptionKey>() {
                    evt.prevent_default();
                    dispatch.call(QuizIntent::Select(key));
                }
            }
            _ => {}
        }
    };

    let screen = map_screen(&snapshot.read(), in_flight() > 0);

    rsx! {
        div { class: "page quiz-page", id: "quiz-root", tabindex: "0", onkeydown: on_key,
            match screen {
                ScreenVm::Start(vm) => rsx! {
                    StartScreen { vm, on_intent: dispatch }
                },
                ScreenVm::Question(vm) => rsx! {
                    QuestionScreen { vm, on_intent: dispatch }
                },
                ScreenVm::Result(vm) => rsx! {
                    ResultScreen { vm, on_intent: dispatch }
                },
            }
        }
    }
}

/// Record `key` and return the state to paint; a rejected selection leaves the state as it was.
pub(crate) fn apply_selection(engine: &QuizEngine, key: OptionKey) -> QuizSnapshot {
    if let Err(err) = engine.select_option(key) {
        debug!("selection {key} rejected: {err}");
    }
    engine.snapshot()
}

#[component]
fn StartScreen(vm: StartScreenVm, on_intent: EventHandler<QuizIntent>) -> Element {
    rsx! {
        section { class: "screen start-screen",
            h2 { "Ready to test your knowledge?" }
            p { "Pick an answer for each question and press Next. Your score is revealed at the end." }
            button {
                class: "btn primary",
                id: "start-btn",
                r#type: "button",
                disabled: vm.start_disabled,
                onclick: move |_| on_intent.call(QuizIntent::Start),
                "{vm.start_label}"
            }
            if let Some(err) = vm.error {
                p { class: "error", role: "alert", "{err.message()}" }
            }
        }
    }
}

#[component]
fn QuestionScreen(vm: QuestionScreenVm, on_intent: EventHandler<QuizIntent>) -> Element {
    let progress_style = vm.progress_style();
    let can_retry = vm.can_retry();

    rsx! {
        section { class: "screen question-screen",
            div { class: "quiz-header",
                span { class: "question-number", "{vm.counter_label}" }
                span { class: "score", "{vm.score_label}" }
            }
            div { class: "progress-bar",
                div { class: "progress-fill", style: "{progress_style}" }
            }
            if let Some(prompt) = vm.prompt.as_ref() {
                h2 { class: "question-text", "{prompt}" }
            } else if let Some(err) = vm.error {
                p { class: "question-text error", role: "alert", "{err.message()}" }
            } else {
                p { class: "question-text muted", "Loading question..." }
            }
            div { class: "options",
                for option in vm.options.iter().cloned() {
                    OptionButton { key: "{option.key}", option: option.clone(), on_intent }
                }
            }
            div { class: "navigation",
                if can_retry {
                    button {
                        class: "btn secondary",
                        id: "retry-btn",
                        r#type: "button",
                        onclick: move |_| on_intent.call(QuizIntent::Retry),
                        "Retry"
                    }
                }
                button {
                    class: "btn primary",
                    id: "next-btn",
                    r#type: "button",
                    disabled: !vm.next_enabled,
                    onclick: move |_| on_intent.call(QuizIntent::Next),
                    "Next"
                }
            }
        }
    }
}

#[component]
fn OptionButton(option: OptionButtonVm, on_intent: EventHandler<QuizIntent>) -> Element {
    let key = option.key;
    rsx! {
        button {
            class: option.class,
            r#type: "button",
            disabled: option.disabled,
            onclick: move |_| on_intent.call(QuizIntent::Select(key)),
            span { class: "option-key", "{key}" }
            span { class: "option-text", "{option.label}" }
        }
    }
}

#[component]
fn ResultScreen(vm: ResultScreenVm, on_intent: EventHandler<QuizIntent>) -> Element {
    let message_class = if vm.passed {
        "result-message pass"
    } else {
        "result-message fail"
    };

    rsx! {
        section { class: "screen result-screen",
            h2 { "Quiz Complete!" }
            p { class: "final-score",
                "Your score: "
                span { id: "final-score", "{vm.score_label}" }
                " ({vm.percentage_label})"
            }
            p { class: "elapsed", "{vm.time_label}" }
            p { class: message_class, "{vm.verdict_message}" }
            div { class: "results-summary",
                for item in vm.items.iter() {
                    div { key: "{item.number_label}", class: "summary-item",
                        div { class: "summary-header {item.status_class}",
                            span { class: "summary-number", "{item.number_label}" }
                            span { class: "summary-status", "{item.status_label}" }
                        }
                        p { class: "summary-question", "{item.prompt}" }
                        div { class: "summary-details",
                            p {
                                strong { "Your Answer:" }
                                " {item.your_answer}"
                            }
                            p {
                                strong { "Correct Answer:" }
                                " {item.correct_answer}"
                            }
                            p { class: "summary-explanation",
                                strong { "Explanation:" }
                                " {item.explanation}"
                            }
                        }
                    }
                }
            }
            button {
                class: "btn primary",
                id: "restart-btn",
                r#type: "button",
                disabled: vm.restart_disabled,
                onclick: move |_| on_intent.call(QuizIntent::Start),
                "{vm.restart_label}"
            }
            if let Some(err) = vm.error {
                p { class: "error", role: "alert", "{err.message()}" }
            }
        }
    }
}
