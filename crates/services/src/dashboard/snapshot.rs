use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A labeled series, ready for whatever draws the chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Predicted score per model, as served by `/api/model_predictions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelPredictions(BTreeMap<String, f64>);

impl ModelPredictions {
    #[must_use]
    pub fn new(scores: BTreeMap<String, f64>) -> Self {
        Self(scores)
    }

    /// Score for `model`, clamped to `0..=100`.
    #[must_use]
    pub fn score(&self, model: &str) -> Option<f64> {
        self.0.get(model).map(|s| s.clamp(0.0, 100.0))
    }

    /// Scores labeled with model display names, in model-key order.
    #[must_use]
    pub fn series(&self) -> ChartSeries {
        ChartSeries {
            labels: self
                .0
                .keys()
                .map(|model| model_display_name(model).to_owned())
                .collect(),
            values: self.0.values().map(|s| s.clamp(0.0, 100.0)).collect(),
        }
    }
}

/// Attempt count and running average for one bucket (difficulty or subject).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub avg_score: f64,
}

/// Per-user quiz statistics, as served by `/api/quiz_stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizStatistics {
    #[serde(default)]
    pub total_attempts: u32,
    #[serde(default)]
    pub average_score: f64,
    #[serde(default)]
    pub best_score: f64,
    #[serde(default)]
    pub difficulty_breakdown: BTreeMap<String, Breakdown>,
    #[serde(default)]
    pub subject_performance: BTreeMap<String, Breakdown>,
    #[serde(default)]
    pub recent_scores: Vec<f64>,
}

impl QuizStatistics {
    /// Recent scores labeled `Quiz 1..N`.
    #[must_use]
    pub fn progress_series(&self) -> ChartSeries {
        ChartSeries {
            labels: (1..=self.recent_scores.len())
                .map(|n| format!("Quiz {n}"))
                .collect(),
            values: self.recent_scores.clone(),
        }
    }

    /// Attempt counts per difficulty level, levels capitalized.
    #[must_use]
    pub fn difficulty_series(&self) -> ChartSeries {
        ChartSeries {
            labels: self
                .difficulty_breakdown
                .keys()
                .map(|level| capitalize(level))
                .collect(),
            values: self
                .difficulty_breakdown
                .values()
                .map(|b| f64::from(b.count))
                .collect(),
        }
    }
}

/// Reply of `POST /api/retrain_models`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrainOutcome {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Color band for a score on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBand {
    Success,
    Warning,
    Danger,
}

impl ScoreBand {
    #[must_use]
    pub fn for_score(score: f64) -> Self {
        if score >= 80.0 {
            ScoreBand::Success
        } else if score >= 60.0 {
            ScoreBand::Warning
        } else {
            ScoreBand::Danger
        }
    }
}

/// Chart label for a model key. Unknown models keep their key.
#[must_use]
pub fn model_display_name(model: &str) -> &str {
    match model {
        "random_forest" => "Random Forest",
        "xgboost" => "XGBoost",
        "neural_network" => "Neural Network",
        other => other,
    }
}

/// Round to one decimal place.
#[must_use]
pub fn format_score(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}

fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
