use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ids::{QuestionId, QuizId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LayoutError {
    #[error("{question} lists option value {value:?} more than once")]
    DuplicateOption { question: QuestionId, value: String },

    #[error("{question} names correct value {value:?} which is not one of its options")]
    UnknownCorrectValue { question: QuestionId, value: String },
}

/// One selectable option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub value: String,
    #[serde(default)]
    pub label: String,
}

impl AnswerOption {
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A question as presented on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub options: Vec<AnswerOption>,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub correct: Option<String>,
}

impl Question {
    /// Whether `value` is a selectable option. A question without options accepts anything.
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        self.options.is_empty() || self.options.iter().any(|opt| opt.value == value)
    }

    #[must_use]
    pub fn option_at(&self, position: usize) -> Option<&AnswerOption> {
        self.options.get(position)
    }
}

/// The questions of one quiz page, in display order.
///
/// Question identifiers are positional: the question at index `i` is `question_<i>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizLayout {
    #[serde(default)]
    quiz_id: Option<QuizId>,
    #[serde(default)]
    questions: Vec<Question>,
}

impl QuizLayout {
    /// Build a layout, checking that option values are unique per question.
    ///
    /// # Errors
    ///
    /// Returns `LayoutError` if a question repeats an option value or names a correct
    /// value that is not among its options.
    pub fn new(quiz_id: Option<QuizId>, questions: Vec<Question>) -> Result<Self, LayoutError> {
        let layout = Self { quiz_id, questions };
        layout.check()?;
        Ok(layout)
    }

    /// A layout of `count` questions that accept any value.
    #[must_use]
    pub fn with_question_count(quiz_id: Option<QuizId>, count: usize) -> Self {
        Self {
            quiz_id,
            questions: vec![Question::default(); count],
        }
    }

    /// Re-run the checks of [`QuizLayout::new`], e.g. after deserializing.
    ///
    /// # Errors
    ///
    /// Returns `LayoutError` on the first inconsistent question.
    pub fn check(&self) -> Result<(), LayoutError> {
        for (id, question) in self.iter() {
            for (pos, opt) in question.options.iter().enumerate() {
                if question.options[..pos].iter().any(|o| o.value == opt.value) {
                    return Err(LayoutError::DuplicateOption {
                        question: id,
                        value: opt.value.clone(),
                    });
                }
            }
            if let Some(correct) = &question.correct {
                if !question.accepts(correct) {
                    return Err(LayoutError::UnknownCorrectValue {
                        question: id,
                        value: correct.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn quiz_id(&self) -> Option<&QuizId> {
        self.quiz_id.as_ref()
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.get(id.index())
    }

    #[must_use]
    pub fn contains(&self, id: QuestionId) -> bool {
        id.index() < self.questions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &Question)> {
        self.questions
            .iter()
            .enumerate()
            .map(|(i, q)| (QuestionId::new(i), q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(values: &[&str]) -> Question {
        Question {
            options: values.iter().map(|v| AnswerOption::new(*v, *v)).collect(),
            ..Question::default()
        }
    }

    #[test]
    fn rejects_duplicate_options() {
        let err = QuizLayout::new(None, vec![question(&["a", "b"]), question(&["a", "a"])])
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::DuplicateOption {
                question: QuestionId::new(1),
                value: "a".into()
            }
        );
    }

    #[test]
    fn rejects_unknown_correct_value() {
        let mut q = question(&["a", "b"]);
        q.correct = Some("z".into());
        assert!(matches!(
            QuizLayout::new(None, vec![q]),
            Err(LayoutError::UnknownCorrectValue { .. })
        ));
    }

    #[test]
    fn open_question_accepts_any_value() {
        let layout = QuizLayout::with_question_count(None, 2);
        let q = layout.question(QuestionId::new(1)).unwrap();
        assert!(q.accepts("anything"));
        assert!(!layout.contains(QuestionId::new(2)));
    }

    #[test]
    fn keeps_embedded_quiz_id() {
        let layout = QuizLayout::new(Some(QuizId::new("abc")), vec![question(&["a", "b"])]).unwrap();
        assert_eq!(layout.total_questions(), 1);
        assert_eq!(layout.quiz_id().map(QuizId::as_str), Some("abc"));
    }
}
