use thiserror::Error;

use crate::model::QuestionId;

/// Rejected transitions of a quiz session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("{0} is not part of this quiz")]
    UnknownQuestion(QuestionId),

    #[error("{question} has no option {value:?}")]
    UnknownOption { question: QuestionId, value: String },

    #[error("answers are locked while the quiz is submitting or submitted")]
    Locked,

    #[error("no submission is in flight")]
    NotSubmitting,
}
