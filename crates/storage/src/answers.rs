use std::sync::Arc;

use quiz_core::model::{AnswerSet, QuizId};
use tracing::debug;

use crate::repository::{LocalStore, StorageError};

/// Serialize an answer set to the JSON object kept in the local store.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_answers(answers: &AnswerSet) -> Result<String, StorageError> {
    serde_json::to_string(answers).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Parse a stored answer set. Anything that is not a JSON object of strings reads as empty.
#[must_use]
pub fn decode_answers(raw: &str) -> AnswerSet {
    match serde_json::from_str::<AnswerSet>(raw) {
        Ok(answers) => answers,
        Err(err) => {
            debug!(error = %err, "discarding unreadable answer set");
            AnswerSet::new()
        }
    }
}

/// Per-quiz answer persistence on top of a [`LocalStore`].
#[derive(Clone)]
pub struct AnswerStore {
    local: Arc<dyn LocalStore>,
}

impl AnswerStore {
    #[must_use]
    pub fn new(local: Arc<dyn LocalStore>) -> Self {
        Self { local }
    }

    /// Load the answers saved for `quiz_id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only when the backend cannot be read; absent or corrupt
    /// values come back as an empty set.
    pub async fn load(&self, quiz_id: &QuizId) -> Result<AnswerSet, StorageError> {
        let raw = self.local.get(&quiz_id.storage_key()).await?;
        Ok(raw.as_deref().map(decode_answers).unwrap_or_default())
    }

    /// Write the full answer set under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the write fails.
    pub async fn save(&self, key: &str, answers: &AnswerSet) -> Result<(), StorageError> {
        let payload = encode_answers(answers)?;
        self.local.set(key, &payload).await
    }

    /// Drop whatever is stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    pub async fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.local.remove(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;
    use quiz_core::model::QuestionId;

    #[test]
    fn decodes_page_format() {
        let answers = decode_answers(r#"{"question_0":"b","question_2":"a"}"#);
        assert_eq!(answers.get(QuestionId::new(0)), Some("b"));
        assert_eq!(answers.get(QuestionId::new(2)), Some("a"));
        assert_eq!(answers.len(), 2);
    }

    #[test]
    fn corrupt_values_read_as_empty() {
        for raw in ["", "not json", "[1,2]", r#"{"question_0":1}"#, "null", "{"] {
            assert!(decode_answers(raw).is_empty(), "{raw:?} should decode as empty");
        }
    }

    #[tokio::test]
    async fn load_falls_back_to_empty() {
        let local = InMemoryStore::new();
        let store = AnswerStore::new(Arc::new(local.clone()));
        let quiz = QuizId::new("abc");

        assert!(store.load(&quiz).await.unwrap().is_empty());

        local.set("quiz_answers_abc", "{broken").await.unwrap();
        assert!(store.load(&quiz).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load() {
        let store = AnswerStore::new(Arc::new(InMemoryStore::new()));
        let quiz = QuizId::new("abc");
        let mut answers = AnswerSet::new();
        answers.insert(QuestionId::new(1), "c");

        store.save(&quiz.storage_key(), &answers).await.unwrap();
        assert_eq!(store.load(&quiz).await.unwrap(), answers);

        store.clear(&quiz.storage_key()).await.unwrap();
        assert!(store.load(&quiz).await.unwrap().is_empty());
    }
}
