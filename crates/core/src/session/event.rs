use chrono::{DateTime, Utc};

use crate::model::{AnswerSet, QuestionId};

/// Keyboard shortcuts understood on the quiz page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    /// Digit `1..=4`: pick that option of the current question.
    Option(u8),
    /// Ctrl/Cmd + Enter.
    Submit,
    Escape,
}

impl NavKey {
    /// Map a key name and modifier state to a shortcut, if it is one.
    #[must_use]
    pub fn from_key(key: &str, ctrl_or_meta: bool) -> Option<Self> {
        match key {
            "1" | "2" | "3" | "4" => key.parse().ok().map(NavKey::Option),
            "Enter" if ctrl_or_meta => Some(NavKey::Submit),
            "Escape" => Some(NavKey::Escape),
            _ => None,
        }
    }
}

/// Everything that can happen to a quiz session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    /// Persisted answers read back on page load.
    Restore(AnswerSet),
    AnswerSelected { question: QuestionId, value: String },
    /// A question scrolled into focus.
    Focus(usize),
    NavigationKey(NavKey),
    SubmitAttempted,
    /// The submit collaborator reports the attempt was accepted.
    SubmissionConfirmed,
    SubmissionFailed,
    TimerTick { now: DateTime<Utc> },
    HighlightExpired(QuestionId),
    HintRequested(usize),
    RevealRequested(usize),
    LeaveRequested,
}
