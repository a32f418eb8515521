//! Emotion classifier collaborator.
//!
//! Posts raw image bytes to a hosted image-classification model and decodes
//! the `[{label, score}, ...]` response. One attempt per request; any failure
//! is reported to the caller, which skips triage for that request.

use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use thiserror::Error;
use tracing::error;
use triage_engine::Prediction;

use crate::config::ClassifierConfig;

/// Longest slice of an error body kept for logs.
const ERROR_BODY_LIMIT: usize = 300;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("inference endpoint returned {status}")]
    Status { status: u16, body: String },
    #[error("inference request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("inference response was not JSON: {0}")]
    InvalidBody(String),
}

impl ClassifierError {
    /// Short form for client-facing messages.
    pub fn summary(&self) -> String {
        match self {
            Self::Status { status, .. } => status.to_string(),
            Self::Transport(e) if e.is_timeout() => "timeout".to_string(),
            Self::Transport(_) => "unreachable".to_string(),
            Self::InvalidBody(_) => "invalid response".to_string(),
        }
    }
}

#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Model identifier reported in responses.
    fn model_id(&self) -> &str;

    async fn classify(
        &self,
        image: Bytes,
        content_type: &str,
    ) -> Result<Vec<Prediction>, ClassifierError>;
}

/// Hugging Face inference API client.
pub struct HfClassifier {
    config: ClassifierConfig,
    endpoint: String,
    http: reqwest::Client,
}

impl HfClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifierError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            endpoint: config.endpoint(),
            config,
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EmotionClassifier for HfClassifier {
    fn model_id(&self) -> &str {
        &self.config.model
    }

    async fn classify(
        &self,
        image: Bytes,
        content_type: &str,
    ) -> Result<Vec<Prediction>, ClassifierError> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, content_type)
            .header(ACCEPT, "application/json")
            .body(image);
        if !self.config.token.is_empty() {
            request = request.bearer_auth(self.config.token.expose());
        }

        let response = request.send().await.map_err(|e| {
            error!(endpoint = %self.endpoint, error = %e, "classifier request failed");
            ClassifierError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(ERROR_BODY_LIMIT)
                .collect();
            error!(
                endpoint = %self.endpoint,
                status = status.as_u16(),
                content_type,
                body = %body,
                "classifier returned error status"
            );
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let raw = response.bytes().await?;
        let value: serde_json::Value = serde_json::from_slice(&raw)
            .map_err(|e| ClassifierError::InvalidBody(e.to_string()))?;
        Ok(Prediction::from_json(&value))
    }
}
