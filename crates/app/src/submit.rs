use quiz_core::QuizSession;
use reqwest::Client;
use tracing::{info, warn};

/// Where a confirmed attempt goes once the tracker lets it through.
pub enum Submitter {
    /// No server: every submission is accepted locally.
    Local,
    /// Form-encoded `POST` of `question_<i>=<value>` pairs.
    Http { client: Client, url: String },
}

impl Submitter {
    #[must_use]
    pub fn from_url(url: Option<String>) -> Self {
        match url {
            Some(url) => Submitter::Http {
                client: Client::new(),
                url,
            },
            None => Submitter::Local,
        }
    }

    /// Send the answers. Returns whether the receiver accepted them.
    pub async fn submit(&self, answers: &[(String, String)]) -> bool {
        match self {
            Submitter::Local => {
                info!(answers = answers.len(), "submission accepted locally");
                true
            }
            Submitter::Http { client, url } => {
                match client.post(url).form(answers).send().await {
                    Ok(resp) if resp.status().is_success() => {
                        info!(%url, status = %resp.status(), "submission accepted");
                        true
                    }
                    Ok(resp) => {
                        warn!(%url, status = %resp.status(), "submission rejected");
                        false
                    }
                    Err(err) => {
                        warn!(%url, error = %err, "submission failed");
                        false
                    }
                }
            }
        }
    }
}

/// Form fields for a submission: one `question_<i>=<value>` pair per counted answer.
#[must_use]
pub fn submission_form(session: &QuizSession) -> Vec<(String, String)> {
    session
        .resolved_answers()
        .map(|(question, value)| (question.to_string(), value.to_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerSet, QuestionId, QuizId, QuizLayout};
    use quiz_core::time::fixed_now;

    #[test]
    fn form_leaves_out_stale_entries() {
        let saved: AnswerSet = [
            ("question_1".to_string(), "b".to_string()),
            ("question_9".to_string(), "a".to_string()),
            ("legacy".to_string(), "c".to_string()),
        ]
        .into_iter()
        .collect();
        let mut session = QuizSession::new(
            QuizLayout::with_question_count(Some(QuizId::new("abc")), 2),
            fixed_now(),
        );
        session.restore(saved);
        session.record_answer(QuestionId::new(0), "x").unwrap();

        assert_eq!(
            submission_form(&session),
            vec![
                ("question_0".to_string(), "x".to_string()),
                ("question_1".to_string(), "b".to_string()),
            ]
        );
    }
}
