use std::time::Duration;

use serde::Serialize;

use crate::model::{AnswerSet, QuestionId, QuizProgress, TimerTone};

/// Instructions emitted by session transitions.
///
/// `PersistAnswers` and `ErasePersisted` target the local store; everything else is for
/// whatever surface renders the quiz.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    PersistAnswers { key: String, answers: AnswerSet },
    ErasePersisted { key: String },

    SelectOption { question: QuestionId, value: String },
    MarkAnswered { question: QuestionId },
    RenderProgress { progress: QuizProgress },
    SetCurrent { question: QuestionId },

    CancelSubmit,
    ShowValidation { message: String, unanswered: usize },
    ScrollTo { question: QuestionId },
    ScrollToTop,
    /// Highlight a question; the driver sends `HighlightExpired` after `duration`.
    Highlight { question: QuestionId, duration: Duration },
    ClearHighlight { question: QuestionId },

    ProceedSubmit,
    DisableSubmit { label: String },
    EnableSubmit,
    StopTimer,
    ResumeTimer,
    RenderTimer { text: String, tone: TimerTone },

    ShowHint { question: QuestionId, hint: String },
    HighlightCorrect { question: QuestionId, value: String },
    ConfirmLeave,
}

impl Effect {
    /// Whether the effect is addressed to the local store rather than the renderer.
    #[must_use]
    pub fn is_persistence(&self) -> bool {
        matches!(self, Effect::PersistAnswers { .. } | Effect::ErasePersisted { .. })
    }
}
