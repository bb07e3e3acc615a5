use std::sync::Arc;

use services::dashboard::format_score;
use services::{
    DashboardState, HttpSnapshotSource, PollerConfig, ScoreBand, SnapshotSource, StatsPoller,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

fn band_label(score: f64) -> &'static str {
    match ScoreBand::for_score(score) {
        ScoreBand::Success => "good",
        ScoreBand::Warning => "fair",
        ScoreBand::Danger => "low",
    }
}

/// Text rendering of the latest snapshots.
#[must_use]
pub fn summarize(state: &DashboardState) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(predictions) = &state.predictions {
        lines.push("Model predictions:".to_owned());
        let series = predictions.series();
        for (model, score) in series.labels.iter().zip(&series.values) {
            lines.push(format!(
                "  {model:<16} {:>5.1}%  {}",
                format_score(*score),
                band_label(*score)
            ));
        }
    }

    if let Some(stats) = &state.stats {
        lines.push(format!(
            "Attempts: {}  average {:.1}%  best {:.1}%",
            stats.total_attempts,
            format_score(stats.average_score),
            format_score(stats.best_score)
        ));
        let difficulty = stats.difficulty_series();
        for (level, count) in difficulty.labels.iter().zip(&difficulty.values) {
            lines.push(format!("  {level:<16} {count:>3} quizzes"));
        }
        let progress = stats.progress_series();
        if !progress.is_empty() {
            let recent: Vec<String> = progress
                .values
                .iter()
                .map(|score| format!("{:.1}", format_score(*score)))
                .collect();
            lines.push(format!("Recent scores: {}", recent.join(", ")));
        }
    }

    if lines.is_empty() {
        lines.push("No dashboard data yet.".to_owned());
    }
    lines
}

fn print_state(state: &DashboardState) {
    for line in summarize(state) {
        println!("{line}");
    }
}

async fn retrain(source: &dyn SnapshotSource, state: &mut DashboardState) {
    println!("Retraining models...");
    match source.retrain_models().await {
        Ok(outcome) if outcome.success => {
            info!("models retrained");
            println!("Models retrained successfully.");
            for update in StatsPoller::refresh(source).await {
                state.apply(update);
            }
            print_state(state);
        }
        Ok(outcome) => {
            let reason = outcome.error.unwrap_or_else(|| "unknown error".to_owned());
            warn!(%reason, "retraining rejected");
            println!("Retraining failed: {reason}");
        }
        Err(err) => {
            warn!(error = %err, "retraining request failed");
            println!("Retraining failed: {err}");
        }
    }
}

/// Show the dashboard and keep it fresh until stdin closes, `quit` or Ctrl+C.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
pub async fn run(config: PollerConfig) -> Result<(), std::io::Error> {
    let source = Arc::new(HttpSnapshotSource::new(&config));
    let mut state = DashboardState::default();
    for update in StatsPoller::refresh(source.as_ref()).await {
        state.apply(update);
    }
    print_state(&state);
    println!("Type `retrain` to retrain models, `quit` to exit.");

    let (tx, mut rx) = mpsc::channel(8);
    let poller = StatsPoller::spawn(source.clone(), &config, tx);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some(update) = rx.recv() => {
                state.apply(update);
                print_state(&state);
            }
            line = lines.next_line() => {
                match line?.as_deref().map(str::trim) {
                    None | Some("quit" | "q") => break,
                    Some("retrain") => retrain(source.as_ref(), &mut state).await,
                    Some("") => {}
                    Some(other) => println!("unknown command: {other}"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    poller.cancel();
    Ok(())
}
