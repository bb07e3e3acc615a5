use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ids::QuestionId;

/// Selected values for one quiz attempt, keyed by question identifier.
///
/// Keys are kept as raw strings so entries written for a different layout survive a
/// round trip through storage. Only canonical `question_<index>` keys are ever looked up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<String, String>);

impl AnswerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` for `question`, replacing any earlier selection.
    ///
    /// Returns the previous value, if any.
    pub fn insert(&mut self, question: QuestionId, value: impl Into<String>) -> Option<String> {
        self.0.insert(question.key(), value.into())
    }

    #[must_use]
    pub fn get(&self, question: QuestionId) -> Option<&str> {
        self.0.get(&question.key()).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, question: QuestionId) -> bool {
        self.0.contains_key(&question.key())
    }

    /// Number of stored entries, including ones that do not map to the current layout.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate raw `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries whose key parses as a canonical question id.
    pub fn canonical(&self) -> impl Iterator<Item = (QuestionId, &str)> {
        self.0
            .iter()
            .filter_map(|(k, v)| k.parse::<QuestionId>().ok().map(|id| (id, v.as_str())))
    }
}

impl FromIterator<(String, String)> for AnswerSet {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let mut answers = AnswerSet::new();
        assert_eq!(answers.insert(QuestionId::new(0), "a"), None);
        assert_eq!(answers.insert(QuestionId::new(0), "c"), Some("a".to_string()));
        assert_eq!(answers.get(QuestionId::new(0)), Some("c"));
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn canonical_skips_foreign_keys() {
        let answers: AnswerSet = [
            ("question_1".to_string(), "b".to_string()),
            ("q42".to_string(), "x".to_string()),
        ]
        .into_iter()
        .collect();

        let canonical: Vec<_> = answers.canonical().collect();
        assert_eq!(canonical, vec![(QuestionId::new(1), "b")]);
        assert_eq!(answers.len(), 2);
    }
}
