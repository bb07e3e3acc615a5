use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use services::{
    DashboardState, DashboardUpdate, ModelPredictions, PollerConfigDraft, PollerError,
    QuizStatistics, RetrainOutcome, SnapshotSource, StatsPoller,
};
use tokio::sync::mpsc;

#[derive(Default)]
struct FakeSource {
    prediction_calls: AtomicUsize,
    stats_calls: AtomicUsize,
    fail_stats: bool,
}

#[async_trait]
impl SnapshotSource for FakeSource {
    async fn fetch_predictions(&self) -> Result<ModelPredictions, PollerError> {
        let n = self.prediction_calls.fetch_add(1, Ordering::SeqCst);
        #[allow(clippy::cast_precision_loss)]
        let score = 50.0 + n as f64;
        Ok(ModelPredictions::new(
            [("xgboost".to_string(), score)].into_iter().collect(),
        ))
    }

    async fn fetch_quiz_stats(&self) -> Result<QuizStatistics, PollerError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_stats {
            return Err(PollerError::HttpStatus(
                reqwest::StatusCode::SERVICE_UNAVAILABLE,
            ));
        }
        Ok(QuizStatistics {
            total_attempts: 1,
            recent_scores: vec![80.0],
            ..QuizStatistics::default()
        })
    }

    async fn retrain_models(&self) -> Result<RetrainOutcome, PollerError> {
        Ok(RetrainOutcome {
            success: true,
            error: None,
        })
    }
}

fn config(predictions_secs: u64, stats_secs: u64) -> services::PollerConfig {
    PollerConfigDraft {
        base_url: Some("http://localhost:5000".into()),
        predictions_every: Some(Duration::from_secs(predictions_secs)),
        stats_every: Some(Duration::from_secs(stats_secs)),
    }
    .validate()
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn polls_both_endpoints_on_their_own_schedule() {
    let source = Arc::new(FakeSource::default());
    let (tx, mut rx) = mpsc::channel(16);
    let handle = StatsPoller::spawn(source.clone(), &config(30, 60), tx);

    let mut state = DashboardState::default();
    // t=30 predictions, t=60 predictions + stats
    for _ in 0..3 {
        state.apply(rx.recv().await.expect("update"));
    }

    assert_eq!(source.prediction_calls.load(Ordering::SeqCst), 2);
    assert_eq!(source.stats_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        state.progress_series().unwrap().labels,
        vec!["Quiz 1".to_string()]
    );
    assert_eq!(state.predictions_series().unwrap().values, vec![51.0]);

    handle.cancel();
    while rx.recv().await.is_some() {}
    assert!(handle.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn failed_fetches_do_not_stop_polling() {
    let source = Arc::new(FakeSource {
        fail_stats: true,
        ..FakeSource::default()
    });
    let (tx, mut rx) = mpsc::channel(16);
    let _handle = StatsPoller::spawn(source.clone(), &config(10, 5), tx);

    for _ in 0..2 {
        let update = rx.recv().await.expect("update");
        assert!(matches!(update, DashboardUpdate::Predictions(_)));
    }
    assert!(source.stats_calls.load(Ordering::SeqCst) >= 3);
}

#[tokio::test]
async fn refresh_once_collects_what_succeeds() {
    let source = FakeSource {
        fail_stats: true,
        ..FakeSource::default()
    };
    let updates = StatsPoller::refresh(&source).await;
    assert_eq!(updates.len(), 1);
    assert!(source.retrain_models().await.unwrap().success);
}
