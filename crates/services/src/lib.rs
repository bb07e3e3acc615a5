#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod timer;
pub mod tracker;

pub use quiz_core::Clock;

pub use app_services::QuizServices;
pub use config::{PollerConfig, PollerConfigDraft, TrackerConfig};
pub use error::{ConfigError, PollerError, QuizServicesError, TrackerError};
pub use timer::ElapsedTicker;
pub use tracker::QuizTracker;

pub use dashboard::{
    ChartSeries, DashboardState, DashboardUpdate, HttpSnapshotSource, ModelPredictions,
    PollerHandle, QuizStatistics, RetrainOutcome, ScoreBand, SnapshotSource, StatsPoller,
};
