use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::PollerConfig;
use crate::error::PollerError;

use super::snapshot::{ModelPredictions, QuizStatistics, RetrainOutcome};

/// Where dashboard snapshots come from.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `PollerError` if the snapshot cannot be fetched or parsed.
    async fn fetch_predictions(&self) -> Result<ModelPredictions, PollerError>;

    /// # Errors
    ///
    /// Returns `PollerError` if the snapshot cannot be fetched or parsed.
    async fn fetch_quiz_stats(&self) -> Result<QuizStatistics, PollerError>;

    /// Ask the server to retrain its models.
    ///
    /// # Errors
    ///
    /// Returns `PollerError` if the request fails; a server-side failure comes back as
    /// `RetrainOutcome { success: false, .. }`.
    async fn retrain_models(&self) -> Result<RetrainOutcome, PollerError>;
}

/// `SnapshotSource` backed by the quiz server's JSON API.
#[derive(Clone)]
pub struct HttpSnapshotSource {
    client: Client,
    base_url: Url,
}

impl HttpSnapshotSource {
    #[must_use]
    pub fn new(config: &PollerConfig) -> Self {
        Self::with_client(Client::new(), config.base_url().clone())
    }

    #[must_use]
    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn endpoint(&self, path: &str) -> Result<Url, PollerError> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, PollerError> {
        let response = self.client.get(self.endpoint(path)?).send().await?;
        if !response.status().is_success() {
            return Err(PollerError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch_predictions(&self) -> Result<ModelPredictions, PollerError> {
        self.get_json("api/model_predictions").await
    }

    async fn fetch_quiz_stats(&self) -> Result<QuizStatistics, PollerError> {
        self.get_json("api/quiz_stats").await
    }

    async fn retrain_models(&self) -> Result<RetrainOutcome, PollerError> {
        let response = self
            .client
            .post(self.endpoint("api/retrain_models")?)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(PollerError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }
}
