use std::time::Duration;

use quiz_core::{Clock, QuizEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::debug;

/// Background task feeding `TimerTick` events to the quiz driver.
///
/// The first tick arrives one period after spawning. Dropping the ticker stops it.
pub struct ElapsedTicker {
    handle: JoinHandle<()>,
}

impl ElapsedTicker {
    /// Spawn the ticker on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if `every` is zero or if called outside a tokio runtime.
    #[must_use]
    pub fn spawn(clock: Clock, every: Duration, events: mpsc::Sender<QuizEvent>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + every, every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if events.send(QuizEvent::TimerTick { now: clock.now() }).await.is_err() {
                    debug!("quiz driver gone, elapsed ticker exiting");
                    break;
                }
            }
        });
        Self { handle }
    }

    /// Cancel the ticker. Further calls are no-ops.
    pub fn stop(&self) {
        self.handle.abort();
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ElapsedTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
