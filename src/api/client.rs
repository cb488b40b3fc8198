//! Client side of `POST /api/chat`, used by the terminal UI.

use log::{debug, info, warn};
use thiserror::Error;

use super::types::{ChatRequest, ChatResponse};
use crate::core::message::ChatMessage;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid JSON from backend: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Talks to a MiniChat proxy at `base_url`.
#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }

    /// Sends `messages` and returns the reply text.
    ///
    /// The text comes from the first of `response`, `reply`, `text`,
    /// `message` present in the body; failing that, the JSON body itself.
    pub async fn send(&self, messages: &[ChatMessage]) -> Result<String, BackendError> {
        let url = self.endpoint();
        info!("Sending {} message(s) to {}", messages.len(), url);

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { messages })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Backend answered {}", status);
            return Err(BackendError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        debug!("Backend response: {} bytes", body.len());

        let value: serde_json::Value = serde_json::from_str(&body)?;
        let text = serde_json::from_value::<ChatResponse>(value.clone())
            .ok()
            .and_then(ChatResponse::into_text)
            .unwrap_or_else(|| value.to_string());
        Ok(text)
    }
}
