use std::fmt;

use async_trait::async_trait;

use super::types::CompletionOptions;
use crate::core::message::ChatMessage;

/// Errors that can occur during provider operations.
///
/// `Display` output is what the proxy returns to clients after
/// `"Server error: "`, so no variant may carry the credential.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Provider misconfigured (missing API key). No request was sent.
    Config(String),
    /// The provider did not answer within the configured timeout.
    Timeout,
    /// Transport-level failure (DNS, connection refused, TLS, body read).
    Network(String),
    /// The provider answered with a non-success status.
    Api {
        status: u16,
        status_text: String,
        body: String,
    },
    /// The provider answered 2xx but no reply text could be found.
    UnexpectedShape,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Config(msg) => write!(f, "{msg}"),
            ProviderError::Timeout => write!(f, "OpenRouter request timed out"),
            ProviderError::Network(msg) => write!(f, "OpenRouter request failed: {msg}"),
            ProviderError::Api {
                status,
                status_text,
                body,
            } => write!(
                f,
                "OpenRouter request failed: {status} {status_text} - {body}"
            ),
            ProviderError::UnexpectedShape => {
                write!(f, "OpenRouter returned an unexpected response shape")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Everything a provider needs to fulfill a completion request.
pub struct CompletionRequest<'a> {
    pub messages: &'a [ChatMessage],
    pub options: CompletionOptions,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Runs one completion round trip and returns the reply text.
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError>;
}
