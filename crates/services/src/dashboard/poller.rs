use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, warn};

use crate::config::PollerConfig;

use super::snapshot::{ChartSeries, ModelPredictions, QuizStatistics};
use super::source::SnapshotSource;

/// A fresh snapshot from one of the dashboard endpoints.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardUpdate {
    Predictions(ModelPredictions),
    QuizStats(QuizStatistics),
}

/// Latest snapshots. Each update replaces its part wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub predictions: Option<ModelPredictions>,
    pub stats: Option<QuizStatistics>,
}

impl DashboardState {
    pub fn apply(&mut self, update: DashboardUpdate) {
        match update {
            DashboardUpdate::Predictions(p) => self.predictions = Some(p),
            DashboardUpdate::QuizStats(s) => self.stats = Some(s),
        }
    }

    #[must_use]
    pub fn predictions_series(&self) -> Option<ChartSeries> {
        self.predictions.as_ref().map(ModelPredictions::series)
    }

    #[must_use]
    pub fn progress_series(&self) -> Option<ChartSeries> {
        self.stats.as_ref().map(QuizStatistics::progress_series)
    }

    #[must_use]
    pub fn difficulty_series(&self) -> Option<ChartSeries> {
        self.stats.as_ref().map(QuizStatistics::difficulty_series)
    }
}

/// Periodic refresh of dashboard snapshots.
pub struct StatsPoller;

impl StatsPoller {
    /// Fetch both snapshots once. Failed fetches are logged and skipped.
    pub async fn refresh(source: &dyn SnapshotSource) -> Vec<DashboardUpdate> {
        let mut updates = Vec::with_capacity(2);
        if let Some(update) = fetch_predictions(source).await {
            updates.push(update);
        }
        if let Some(update) = fetch_stats(source).await {
            updates.push(update);
        }
        updates
    }

    /// Spawn the polling task. Each endpoint first refreshes one period after start.
    #[must_use]
    pub fn spawn(
        source: Arc<dyn SnapshotSource>,
        config: &PollerConfig,
        updates: mpsc::Sender<DashboardUpdate>,
    ) -> PollerHandle {
        let predictions_every = config.predictions_every();
        let stats_every = config.stats_every();

        let handle = tokio::spawn(async move {
            let start = Instant::now();
            let mut predictions = interval_at(start + predictions_every, predictions_every);
            let mut stats = interval_at(start + stats_every, stats_every);
            predictions.set_missed_tick_behavior(MissedTickBehavior::Delay);
            stats.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                let update = tokio::select! {
                    _ = predictions.tick() => fetch_predictions(source.as_ref()).await,
                    _ = stats.tick() => fetch_stats(source.as_ref()).await,
                };
                let Some(update) = update else {
                    continue;
                };
                if updates.send(update).await.is_err() {
                    debug!("dashboard receiver gone, poller exiting");
                    break;
                }
            }
        });

        PollerHandle { handle }
    }
}

async fn fetch_predictions(source: &dyn SnapshotSource) -> Option<DashboardUpdate> {
    match source.fetch_predictions().await {
        Ok(p) => Some(DashboardUpdate::Predictions(p)),
        Err(err) => {
            warn!(error = %err, "updating predictions failed");
            None
        }
    }
}

async fn fetch_stats(source: &dyn SnapshotSource) -> Option<DashboardUpdate> {
    match source.fetch_quiz_stats().await {
        Ok(s) => Some(DashboardUpdate::QuizStats(s)),
        Err(err) => {
            warn!(error = %err, "updating quiz statistics failed");
            None
        }
    }
}

/// Owner of a running poller. Dropping it cancels polling.
pub struct PollerHandle {
    handle: JoinHandle<()>,
}

impl PollerHandle {
    pub fn cancel(&self) {
        self.handle.abort();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
