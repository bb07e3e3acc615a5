mod poller;
mod snapshot;
mod source;

pub use poller::{DashboardState, DashboardUpdate, PollerHandle, StatsPoller};
pub use snapshot::{
    Breakdown, ChartSeries, ModelPredictions, QuizStatistics, RetrainOutcome, ScoreBand,
    format_score, model_display_name,
};
pub use source::{HttpSnapshotSource, SnapshotSource};
