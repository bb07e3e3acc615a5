use std::sync::Arc;

use quiz_core::model::QuizLayout;
use storage::AnswerStore;
use storage::repository::Storage;

use crate::Clock;
use crate::config::TrackerConfig;
use crate::error::QuizServicesError;
use crate::tracker::QuizTracker;

/// Assembles the store, clock and settings quiz attempts run against.
#[derive(Clone)]
pub struct QuizServices {
    clock: Clock,
    config: TrackerConfig,
    answers: AnswerStore,
}

impl QuizServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `QuizServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: TrackerConfig,
    ) -> Result<Self, QuizServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, config))
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, TrackerConfig::default())
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, config: TrackerConfig) -> Self {
        Self {
            clock,
            config,
            answers: AnswerStore::new(Arc::clone(&storage.local)),
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Start an attempt for `layout`; the caller restores saved answers next.
    #[must_use]
    pub fn start_quiz(&self, layout: QuizLayout) -> QuizTracker {
        QuizTracker::start(layout, self.answers.clone(), &self.clock, &self.config)
    }
}
