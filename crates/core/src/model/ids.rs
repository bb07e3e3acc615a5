use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix shared by every canonical question identifier.
pub const QUESTION_PREFIX: &str = "question_";

/// Prefix of the local store key holding a quiz attempt's answers.
pub const ANSWERS_KEY_PREFIX: &str = "quiz_answers_";

/// Identifier of one quiz attempt.
///
/// The page may embed either a string or an integer; both are kept as text.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizId(String);

impl QuizId {
    /// Creates a new `QuizId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fallback identifier used when the page carries none.
    ///
    /// Uniqueness is only as good as the millisecond clock.
    #[must_use]
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(at.timestamp_millis().to_string())
    }

    /// Resolve the identifier for a new attempt, falling back to `now` when absent.
    #[must_use]
    pub fn resolve(embedded: Option<&QuizId>, now: DateTime<Utc>) -> Self {
        embedded
            .filter(|id| !id.0.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| Self::from_timestamp(now))
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key under which the attempt's answers are persisted.
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("{ANSWERS_KEY_PREFIX}{}", self.0)
    }
}

impl From<u64> for QuizId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for QuizId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Canonical identifier of a question, derived from its position (`question_<index>`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuestionId(usize);

impl QuestionId {
    /// Creates a new `QuestionId`
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the zero-based question index
    #[must_use]
    pub fn index(&self) -> usize {
        self.0
    }

    /// Returns the `question_<index>` form used as the answer key.
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl Serialize for QuestionId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QuestionId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Debug for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuizId({})", self.0)
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{QUESTION_PREFIX}{}", self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for QuestionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(QUESTION_PREFIX)
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| {
                let index = digits.parse::<usize>().ok()?;
                // only the form Display produces is canonical
                (index.to_string() == digits).then_some(QuestionId::new(index))
            })
            .ok_or_else(|| ParseIdError {
                kind: "QuestionId".to_string(),
            })
    }
}

impl FromStr for QuizId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseIdError {
                kind: "QuizId".to_string(),
            });
        }
        Ok(QuizId::new(trimmed))
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn test_question_id_display() {
        let id = QuestionId::new(3);
        assert_eq!(id.to_string(), "question_3");
    }

    #[test]
    fn test_question_id_from_str() {
        let id: QuestionId = "question_12".parse().unwrap();
        assert_eq!(id, QuestionId::new(12));
    }

    #[test]
    fn test_question_id_rejects_foreign_keys() {
        assert!("q_1".parse::<QuestionId>().is_err());
        assert!("question_".parse::<QuestionId>().is_err());
        assert!("question_+1".parse::<QuestionId>().is_err());
        assert!("question_1a".parse::<QuestionId>().is_err());
    }

    #[test]
    fn test_question_id_rejects_leading_zeros() {
        assert!("question_01".parse::<QuestionId>().is_err());
        assert!("question_00".parse::<QuestionId>().is_err());
        assert_eq!("question_0".parse::<QuestionId>().unwrap(), QuestionId::new(0));
        assert_eq!("question_10".parse::<QuestionId>().unwrap(), QuestionId::new(10));
    }

    #[test]
    fn test_quiz_id_storage_key() {
        assert_eq!(QuizId::new("abc").storage_key(), "quiz_answers_abc");
        assert_eq!(QuizId::from(42).storage_key(), "quiz_answers_42");
    }

    #[test]
    fn test_quiz_id_falls_back_to_timestamp() {
        let now = fixed_now();
        let id = QuizId::resolve(None, now);
        assert_eq!(id.as_str(), "1700000000000");

        let blank = QuizId::new("  ");
        assert_eq!(QuizId::resolve(Some(&blank), now), id);

        let embedded = QuizId::new("abc");
        assert_eq!(QuizId::resolve(Some(&embedded), now), embedded);
    }

    #[test]
    fn test_quiz_id_from_str_invalid() {
        assert!("".parse::<QuizId>().is_err());
    }
}
