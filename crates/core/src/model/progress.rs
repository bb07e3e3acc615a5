use serde::Serialize;

/// How the submit control should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubmitState {
    AllAnswered,
    Partial,
}

/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

impl QuizProgress {
    #[must_use]
    pub fn new(answered: usize, total: usize) -> Self {
        let answered = answered.min(total);
        Self {
            total,
            answered,
            remaining: total - answered,
            is_complete: answered == total,
        }
    }

    /// Share of answered questions as a percentage. An empty quiz counts as done.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.answered as f64 / self.total as f64 * 100.0
    }

    /// [`QuizProgress::percent`] rounded to two decimals.
    #[must_use]
    pub fn percent_rounded(&self) -> f64 {
        (self.percent() * 100.0).round() / 100.0
    }

    /// `answered/total`, as shown on the submit control.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}/{}", self.answered, self.total)
    }

    #[must_use]
    pub fn submit_state(&self) -> SubmitState {
        if self.is_complete {
            SubmitState::AllAnswered
        } else {
            SubmitState::Partial
        }
    }
}
