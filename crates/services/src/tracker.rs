use quiz_core::model::{QuestionId, QuizLayout, QuizProgress};
use quiz_core::{Clock, Effect, QuizEvent, QuizSession};
use storage::AnswerStore;
use tracing::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::error::TrackerError;

/// One quiz attempt wired to the local store.
///
/// Session transitions stay pure; this type carries out their persistence effects
/// before returning, so the stored copy always matches memory when a call completes.
/// Callers receive only the effects meant for the renderer.
pub struct QuizTracker {
    session: QuizSession,
    store: AnswerStore,
}

impl QuizTracker {
    /// Start a fresh attempt. Call [`QuizTracker::restore`] next to pick up saved answers.
    #[must_use]
    pub fn start(layout: QuizLayout, store: AnswerStore, clock: &Clock, config: &TrackerConfig) -> Self {
        let session =
            QuizSession::new(layout, clock.now()).with_highlight_duration(config.highlight_for);
        info!(
            quiz_id = %session.quiz_id(),
            questions = session.total_questions(),
            "quiz attempt started"
        );
        Self { session, store }
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        self.session.progress()
    }

    #[must_use]
    pub fn validate(&self) -> bool {
        self.session.validate()
    }

    pub fn unanswered(&self) -> impl Iterator<Item = QuestionId> + Clone + '_ {
        self.session.unanswered()
    }

    /// Re-apply the answers saved for this quiz. A store that cannot be read counts as empty.
    pub async fn restore(&mut self) -> Vec<Effect> {
        let saved = match self.store.load(self.session.quiz_id()).await {
            Ok(saved) => saved,
            Err(err) => {
                warn!(quiz_id = %self.session.quiz_id(), error = %err, "could not read saved answers");
                Default::default()
            }
        };
        debug!(quiz_id = %self.session.quiz_id(), entries = saved.len(), "restoring answers");
        let effects = self.session.restore(saved);
        self.apply(effects).await
    }

    /// Record an answer and write the full set through to the store.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Quiz` if the session rejects the answer.
    pub async fn record_answer(
        &mut self,
        question: QuestionId,
        value: impl Into<String>,
    ) -> Result<Vec<Effect>, TrackerError> {
        let effects = self.session.record_answer(question, value)?;
        Ok(self.apply(effects).await)
    }

    /// Gate a submit attempt.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Quiz` if a submission is already in flight or done.
    pub fn on_submit_attempt(&mut self) -> Result<Vec<Effect>, TrackerError> {
        let effects = self.session.on_submit_attempt()?;
        if effects.contains(&Effect::CancelSubmit) {
            info!(
                quiz_id = %self.session.quiz_id(),
                unanswered = self.session.unanswered().count(),
                "submission blocked"
            );
        }
        Ok(effects)
    }

    /// The submit collaborator accepted the attempt; erase the saved answers.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Quiz` if no submission was let through.
    pub async fn confirm_submission(&mut self) -> Result<Vec<Effect>, TrackerError> {
        let effects = self.session.confirm_submission()?;
        info!(quiz_id = %self.session.quiz_id(), "submission confirmed");
        Ok(self.apply(effects).await)
    }

    /// The submit collaborator rejected the attempt; answers stay saved.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Quiz` if no submission was let through.
    pub fn submission_failed(&mut self) -> Result<Vec<Effect>, TrackerError> {
        let effects = self.session.submission_failed()?;
        warn!(quiz_id = %self.session.quiz_id(), "submission failed, answers kept");
        Ok(effects)
    }

    /// Dispatch any session event, carrying out persistence along the way.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Quiz` when the session rejects the event.
    pub async fn handle(&mut self, event: QuizEvent) -> Result<Vec<Effect>, TrackerError> {
        match event {
            QuizEvent::SubmitAttempted => self.on_submit_attempt(),
            QuizEvent::SubmissionConfirmed => self.confirm_submission().await,
            QuizEvent::SubmissionFailed => self.submission_failed(),
            other => {
                let effects = self.session.handle(other)?;
                Ok(self.apply(effects).await)
            }
        }
    }

    /// Run store-bound effects in order and hand back the rest.
    async fn apply(&self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut render = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                Effect::PersistAnswers { key, answers } => {
                    if let Err(err) = self.store.save(&key, &answers).await {
                        warn!(%key, error = %err, "answers not saved");
                    }
                }
                Effect::ErasePersisted { key } => {
                    if let Err(err) = self.store.clear(&key).await {
                        warn!(%key, error = %err, "saved answers not erased");
                    }
                }
                other => render.push(other),
            }
        }
        render
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use quiz_core::model::QuizId;
    use quiz_core::time::fixed_clock;
    use storage::repository::{InMemoryStore, LocalStore};

    fn tracker(local: &InMemoryStore, questions: usize) -> QuizTracker {
        QuizTracker::start(
            QuizLayout::with_question_count(Some(QuizId::new("abc")), questions),
            AnswerStore::new(Arc::new(local.clone())),
            &fixed_clock(),
            &TrackerConfig::default(),
        )
    }

    #[tokio::test]
    async fn persistence_effects_are_not_returned() {
        let local = InMemoryStore::new();
        let mut tracker = tracker(&local, 2);
        let effects = tracker.record_answer(QuestionId::new(0), "a").await.unwrap();
        assert!(effects.iter().all(|effect| !effect.is_persistence()));
        assert_eq!(
            local.get("quiz_answers_abc").await.unwrap().as_deref(),
            Some(r#"{"question_0":"a"}"#)
        );
    }

    #[tokio::test]
    async fn write_failure_keeps_the_answer_in_memory() {
        let local = InMemoryStore::new().with_quota(1);
        let mut tracker = tracker(&local, 2);
        tracker.record_answer(QuestionId::new(1), "b").await.unwrap();
        assert_eq!(tracker.progress().answered, 1);
        assert_eq!(local.get("quiz_answers_abc").await.unwrap(), None);
    }
}
