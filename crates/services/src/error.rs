//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::QuizError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `QuizTracker`.
///
/// Store failures never show up here: they are logged and the attempt carries on
/// with in-memory state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrackerError {
    #[error(transparent)]
    Quiz(#[from] QuizError),
}

/// Errors emitted by the dashboard snapshot source.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PollerError {
    #[error("stats request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

/// Errors emitted while validating configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid stats base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("{field} must be greater than zero")]
    ZeroInterval { field: &'static str },
}

/// Errors emitted while bootstrapping quiz services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
