use std::env;
use std::time::Duration;

use quiz_core::session::DEFAULT_HIGHLIGHT;
use url::Url;

use crate::error::ConfigError;

/// Default refresh period for model predictions.
pub const PREDICTIONS_EVERY: Duration = Duration::from_secs(30);

/// Default refresh period for quiz statistics.
pub const STATS_EVERY: Duration = Duration::from_secs(60);

/// Knobs for a quiz attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackerConfig {
    pub highlight_for: Duration,
    pub tick_every: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            highlight_for: DEFAULT_HIGHLIGHT,
            tick_every: Duration::from_secs(1),
        }
    }
}

/// Unvalidated dashboard polling settings, e.g. straight from flags or the environment.
#[derive(Clone, Debug, Default)]
pub struct PollerConfigDraft {
    pub base_url: Option<String>,
    pub predictions_every: Option<Duration>,
    pub stats_every: Option<Duration>,
}

/// Validated dashboard polling settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollerConfig {
    base_url: Url,
    predictions_every: Duration,
    stats_every: Duration,
}

impl PollerConfigDraft {
    /// Read `QUIZ_STATS_URL`, `QUIZ_PREDICTIONS_SECS` and `QUIZ_STATS_SECS`.
    #[must_use]
    pub fn from_env() -> Self {
        let secs = |name: &str| {
            env::var(name)
                .ok()
                .and_then(|raw| raw.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
        };
        Self {
            base_url: env::var("QUIZ_STATS_URL").ok(),
            predictions_every: secs("QUIZ_PREDICTIONS_SECS"),
            stats_every: secs("QUIZ_STATS_SECS"),
        }
    }

    /// Validate and fill defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL is missing or invalid, or an interval is zero.
    pub fn validate(self) -> Result<PollerConfig, ConfigError> {
        let raw = self
            .base_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ConfigError::InvalidBaseUrl(String::new()))?;
        let base_url = Url::parse(&raw).map_err(|_| ConfigError::InvalidBaseUrl(raw.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl(raw));
        }

        let predictions_every = self.predictions_every.unwrap_or(PREDICTIONS_EVERY);
        if predictions_every.is_zero() {
            return Err(ConfigError::ZeroInterval {
                field: "predictions_every",
            });
        }
        let stats_every = self.stats_every.unwrap_or(STATS_EVERY);
        if stats_every.is_zero() {
            return Err(ConfigError::ZeroInterval {
                field: "stats_every",
            });
        }

        Ok(PollerConfig {
            base_url,
            predictions_every,
            stats_every,
        })
    }
}

impl PollerConfig {
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn predictions_every(&self) -> Duration {
        self.predictions_every
    }

    #[must_use]
    pub fn stats_every(&self) -> Duration {
        self.stats_every
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_default_intervals() {
        let config = PollerConfigDraft {
            base_url: Some(" http://localhost:5000 ".into()),
            ..PollerConfigDraft::default()
        }
        .validate()
        .unwrap();
        assert_eq!(config.base_url().as_str(), "http://localhost:5000/");
        assert_eq!(config.predictions_every(), Duration::from_secs(30));
        assert_eq!(config.stats_every(), Duration::from_secs(60));
    }

    #[test]
    fn rejects_bad_urls() {
        for raw in [None, Some(""), Some("not a url"), Some("mailto:someone@example.com")] {
            let draft = PollerConfigDraft {
                base_url: raw.map(str::to_string),
                ..PollerConfigDraft::default()
            };
            assert!(matches!(draft.validate(), Err(ConfigError::InvalidBaseUrl(_))));
        }
    }

    #[test]
    fn rejects_zero_interval() {
        let draft = PollerConfigDraft {
            base_url: Some("http://localhost".into()),
            stats_every: Some(Duration::ZERO),
            ..PollerConfigDraft::default()
        };
        assert!(matches!(
            draft.validate(),
            Err(ConfigError::ZeroInterval { field: "stats_every" })
        ));
    }
}
