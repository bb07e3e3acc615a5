use std::sync::Arc;

use quiz_core::model::{AnswerOption, QuestionId, Question, QuizId, QuizLayout};
use quiz_core::time::fixed_now;
use quiz_core::{Effect, NavKey, QuizError, QuizEvent};
use services::{Clock, QuizServices, TrackerConfig, TrackerError};
use storage::repository::{InMemoryStore, LocalStore, Storage};

fn layout(quiz_id: &str, count: usize) -> QuizLayout {
    let questions = (0..count)
        .map(|i| Question {
            text: format!("Q{i}"),
            options: ["a", "b", "c"]
                .iter()
                .map(|v| AnswerOption::new(*v, *v))
                .collect(),
            ..Question::default()
        })
        .collect();
    QuizLayout::new(Some(QuizId::new(quiz_id)), questions).unwrap()
}

fn services(local: &InMemoryStore) -> QuizServices {
    let storage = Storage {
        local: Arc::new(local.clone()),
    };
    QuizServices::from_storage(&storage, Clock::fixed(fixed_now()), TrackerConfig::default())
}

#[tokio::test]
async fn answers_survive_reload() {
    let local = InMemoryStore::new();

    let mut first = services(&local).start_quiz(layout("abc", 3));
    first.restore().await;
    first.record_answer(QuestionId::new(0), "b").await.unwrap();
    first.record_answer(QuestionId::new(2), "a").await.unwrap();
    drop(first);

    let mut reloaded = services(&local).start_quiz(layout("abc", 3));
    let effects = reloaded.restore().await;

    assert_eq!(reloaded.session().answers().get(QuestionId::new(0)), Some("b"));
    assert_eq!(reloaded.session().answers().get(QuestionId::new(2)), Some("a"));
    assert!(effects.contains(&Effect::MarkAnswered {
        question: QuestionId::new(2)
    }));
    assert!((reloaded.progress().percent_rounded() - 66.67).abs() < f64::EPSILON);
    assert_eq!(
        reloaded.unanswered().collect::<Vec<_>>(),
        vec![QuestionId::new(1)]
    );
}

#[tokio::test]
async fn restore_twice_is_stable() {
    let local = InMemoryStore::new();
    local
        .set("quiz_answers_abc", r#"{"question_1":"c","question_9":"a"}"#)
        .await
        .unwrap();

    let mut tracker = services(&local).start_quiz(layout("abc", 3));
    let first = tracker.restore().await;
    let answers = tracker.session().answers().clone();
    let second = tracker.restore().await;

    assert_eq!(first, second);
    assert_eq!(tracker.session().answers(), &answers);
    assert_eq!(tracker.progress().answered, 1);
}

#[tokio::test]
async fn corrupt_saved_answers_start_empty() {
    let local = InMemoryStore::new();
    local.set("quiz_answers_abc", "{{{").await.unwrap();

    let mut tracker = services(&local).start_quiz(layout("abc", 2));
    let effects = tracker.restore().await;
    assert_eq!(tracker.progress().answered, 0);
    assert_eq!(effects.len(), 1);
}

#[tokio::test]
async fn blocked_submit_keeps_saved_answers() {
    let local = InMemoryStore::new();
    let mut tracker = services(&local).start_quiz(layout("abc", 3));
    tracker.restore().await;
    tracker.record_answer(QuestionId::new(0), "b").await.unwrap();
    tracker.record_answer(QuestionId::new(2), "a").await.unwrap();
    let before = local.get("quiz_answers_abc").await.unwrap();

    let effects = tracker.handle(QuizEvent::SubmitAttempted).await.unwrap();
    assert_eq!(effects[0], Effect::CancelSubmit);
    assert!(effects.contains(&Effect::ShowValidation {
        message: "Please answer all questions. You have 1 unanswered question.".into(),
        unanswered: 1,
    }));
    assert!(!tracker.validate());

    let cleared = tracker
        .handle(QuizEvent::HighlightExpired(QuestionId::new(1)))
        .await
        .unwrap();
    assert_eq!(
        cleared,
        vec![Effect::ClearHighlight {
            question: QuestionId::new(1)
        }]
    );
    assert_eq!(local.get("quiz_answers_abc").await.unwrap(), before);
}

#[tokio::test]
async fn confirmed_submit_erases_saved_answers() {
    let local = InMemoryStore::new();
    local.set("quiz_answers_other", "{}").await.unwrap();

    let mut tracker = services(&local).start_quiz(layout("abc", 2));
    tracker.restore().await;
    tracker.handle(QuizEvent::Focus(0)).await.unwrap();
    tracker
        .handle(QuizEvent::NavigationKey(NavKey::Option(1)))
        .await
        .unwrap();
    tracker.record_answer(QuestionId::new(1), "c").await.unwrap();
    assert!(tracker.validate());

    let effects = tracker
        .handle(QuizEvent::NavigationKey(NavKey::Submit))
        .await
        .unwrap();
    assert!(effects.contains(&Effect::StopTimer));
    assert!(local.get("quiz_answers_abc").await.unwrap().is_some());

    let effects = tracker.handle(QuizEvent::SubmissionConfirmed).await.unwrap();
    assert!(effects.is_empty());
    assert_eq!(local.get("quiz_answers_abc").await.unwrap(), None);
    assert!(local.get("quiz_answers_other").await.unwrap().is_some());
}

#[tokio::test]
async fn failed_submit_keeps_answers_for_next_load() {
    let local = InMemoryStore::new();
    let mut tracker = services(&local).start_quiz(layout("abc", 1));
    tracker.record_answer(QuestionId::new(0), "a").await.unwrap();
    tracker.on_submit_attempt().unwrap();

    let locked = tracker.record_answer(QuestionId::new(0), "b").await;
    assert!(matches!(locked, Err(TrackerError::Quiz(QuizError::Locked))));

    let effects = tracker.handle(QuizEvent::SubmissionFailed).await.unwrap();
    assert_eq!(effects, vec![Effect::EnableSubmit, Effect::ResumeTimer]);
    assert_eq!(
        local.get("quiz_answers_abc").await.unwrap().as_deref(),
        Some(r#"{"question_0":"a"}"#)
    );
}

#[tokio::test]
async fn zero_question_quiz_submits_immediately() {
    let services = QuizServices::in_memory(Clock::fixed(fixed_now()));
    let mut tracker = services.start_quiz(QuizLayout::default());
    tracker.restore().await;
    assert!(tracker.validate());
    assert_eq!(tracker.unanswered().count(), 0);
    let effects = tracker.on_submit_attempt().unwrap();
    assert_eq!(effects[0], Effect::ProceedSubmit);
}
