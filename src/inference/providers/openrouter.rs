//! OpenRouter provider implementation using the chat completions API.
//!
//! One request, one JSON response, no streaming. The reply text is pulled
//! out of whichever of the known response layouts the provider used:
//! - chat completion: `choices[0].message.content`
//! - text completion: `choices[0].text`
//! - responses-style output: `output[0].content`

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::core::message::ChatMessage;
use crate::inference::{CompletionProvider, CompletionRequest, ProviderConfig, ProviderError};

/// Upper bound on how much of an error body is echoed back in `ProviderError::Api`.
const MAX_ERROR_BODY_CHARS: usize = 500;

// ============================================================================
// OpenRouter Chat Completions Types
// ============================================================================

/// The request body for `/chat/completions`.
#[derive(Serialize, Debug)]
struct ChatCompletionRequest<'a> {
    model: String,
    messages: &'a [ChatMessage],
    max_tokens: u32,
}

/// JSON pointers to the reply text, one per known layout, in precedence order.
const CHAT_CONTENT: &str = "/choices/0/message/content";
const TEXT_CONTENT: &str = "/choices/0/text";
const OUTPUT_CONTENT: &str = "/output/0/content";

/// The response layouts we know how to read, plus an explicit fallback.
#[derive(Debug, Clone, PartialEq)]
enum ReplyShape {
    ChatCompletion(String),
    TextCompletion(String),
    ResponsesOutput(String),
    Unrecognized,
}

impl ReplyShape {
    /// Classifies a success body. Precedence follows the order of the
    /// variants: the first layout with a present value wins.
    fn classify(body: &[u8]) -> Self {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                debug!("Response body is not JSON: {}", e);
                return ReplyShape::Unrecognized;
            }
        };

        // Paths are read independently; other fields may have any type
        let text_at = |pointer: &str| {
            value
                .pointer(pointer)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        if let Some(content) = text_at(CHAT_CONTENT) {
            return ReplyShape::ChatCompletion(content);
        }
        if let Some(text) = text_at(TEXT_CONTENT) {
            return ReplyShape::TextCompletion(text);
        }
        if let Some(content) = text_at(OUTPUT_CONTENT) {
            return ReplyShape::ResponsesOutput(content);
        }

        ReplyShape::Unrecognized
    }

    /// Reply text, if the shape carried any. Empty text is not a reply.
    fn into_reply(self) -> Option<String> {
        match self {
            ReplyShape::ChatCompletion(text)
            | ReplyShape::TextCompletion(text)
            | ReplyShape::ResponsesOutput(text)
                if !text.is_empty() =>
            {
                Some(text)
            }
            _ => None,
        }
    }
}

/// Shortens `text` to at most `max` characters, marking the cut.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// OpenRouter API provider using chat completions.
pub struct OpenRouterProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    /// Creates a new OpenRouter provider from resolved configuration.
    ///
    /// A missing API key is not an error here; every `complete` call fails
    /// with `ProviderError::Config` until one is configured.
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Sends the request and extracts the reply text.
    async fn send_request(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest<'_>,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", "MiniChat")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        debug!("OpenRouter response status: {}", status);

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            warn!("OpenRouter API error: {} - {}", status, body);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body: truncate_chars(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let shape = ReplyShape::classify(&body);
        debug!("OpenRouter reply shape: {:?}", shape);
        shape.into_reply().ok_or_else(|| {
            warn!(
                "Unexpected response shape from OpenRouter: {}",
                truncate_chars(&String::from_utf8_lossy(&body), MAX_ERROR_BODY_CHARS)
            );
            ProviderError::UnexpectedShape
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            ProviderError::Config("OPENROUTER_API_KEY is not configured on the server".to_string())
        })?;

        let payload = ChatCompletionRequest {
            model: self.config.select_model(request.options.model.as_deref()),
            messages: request.messages,
            max_tokens: request.options.max_tokens,
        };

        info!(
            "OpenRouter request: model={}, message_count={}, max_tokens={}, timeout={:?}",
            payload.model,
            payload.messages.len(),
            payload.max_tokens,
            request.options.timeout,
        );

        // Dropping the future on expiry aborts the in-flight connection.
        match tokio::time::timeout(request.options.timeout, self.send_request(api_key, &payload))
            .await
        {
            Ok(result) => {
                if let Ok(reply) = &result {
                    info!("OpenRouter reply received ({} chars)", reply.len());
                }
                result
            }
            Err(_) => {
                warn!(
                    "OpenRouter request timed out after {:?}",
                    request.options.timeout
                );
                Err(ProviderError::Timeout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::CompletionOptions;

    #[test]
    fn test_classify_chat_completion() {
        let body = br#"{"choices":[{"message":{"role":"assistant","content":"hi"}}]}"#;
        assert_eq!(
            ReplyShape::classify(body),
            ReplyShape::ChatCompletion("hi".to_string())
        );
    }

    #[test]
    fn test_classify_text_completion() {
        let body = br#"{"choices":[{"text":"plain"}]}"#;
        assert_eq!(
            ReplyShape::classify(body),
            ReplyShape::TextCompletion("plain".to_string())
        );
    }

    #[test]
    fn test_classify_null_message_content_falls_through_to_text() {
        let body = br#"{"choices":[{"message":{"content":null},"text":"fallback"}]}"#;
        assert_eq!(
            ReplyShape::classify(body),
            ReplyShape::TextCompletion("fallback".to_string())
        );
    }

    #[test]
    fn test_classify_responses_output() {
        let body = br#"{"output":[{"content":"from output"}]}"#;
        assert_eq!(
            ReplyShape::classify(body),
            ReplyShape::ResponsesOutput("from output".to_string())
        );
    }

    #[test]
    fn test_classify_empty_choices_falls_through_to_output() {
        let body = br#"{"choices":[],"output":[{"content":"second"}]}"#;
        assert_eq!(
            ReplyShape::classify(body),
            ReplyShape::ResponsesOutput("second".to_string())
        );
    }

    #[test]
    fn test_classify_chat_wins_over_output() {
        let body = br#"{"choices":[{"message":{"content":"first"}}],"output":[{"content":"second"}]}"#;
        assert_eq!(
            ReplyShape::classify(body),
            ReplyShape::ChatCompletion("first".to_string())
        );
    }

    #[test]
    fn test_classify_ignores_mistyped_output() {
        let body = br#"{"choices":[{"message":{"content":"hi"}}],"output":"n/a"}"#;
        assert_eq!(
            ReplyShape::classify(body),
            ReplyShape::ChatCompletion("hi".to_string())
        );
    }

    #[test]
    fn test_classify_ignores_multipart_later_choice() {
        let body = br#"{"choices":[{"message":{"content":"hi"}},{"message":{"content":[{"type":"text","text":"x"}]}}]}"#;
        assert_eq!(
            ReplyShape::classify(body),
            ReplyShape::ChatCompletion("hi".to_string())
        );
    }

    #[test]
    fn test_classify_non_string_content_falls_through_to_output() {
        let body = br#"{"choices":[{"message":{"content":42}}],"output":[{"content":"from output"}]}"#;
        assert_eq!(
            ReplyShape::classify(body),
            ReplyShape::ResponsesOutput("from output".to_string())
        );
    }

    #[test]
    fn test_classify_unrecognized_bodies() {
        let bodies: [&[u8]; 5] = [
            br#"{"id":"gen-1","object":"chat.completion"}"#,
            br#"{"choices":[{"message":{}}]}"#,
            br#"[1,2,3]"#,
            br#"not json at all"#,
            br#""#,
        ];
        for body in bodies {
            assert_eq!(ReplyShape::classify(body), ReplyShape::Unrecognized);
        }
    }

    #[test]
    fn test_empty_reply_text_is_not_a_reply() {
        let shape = ReplyShape::classify(br#"{"choices":[{"message":{"content":""}}]}"#);
        assert_eq!(shape, ReplyShape::ChatCompletion(String::new()));
        assert_eq!(shape.into_reply(), None);
    }

    /// Contract test: the payload is exactly `{model, messages, max_tokens}`.
    #[test]
    fn test_request_serialization() {
        let messages = vec![
            ChatMessage::system("You are a helpful assistant."),
            ChatMessage::user("Hello"),
        ];
        let req = ChatCompletionRequest {
            model: "test-model".to_string(),
            messages: &messages,
            max_tokens: 512,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(
            json,
            r#"{"model":"test-model","messages":[{"role":"system","content":"You are a helpful assistant."},{"role":"user","content":"Hello"}],"max_tokens":512}"#
        );
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        // Multi-byte characters are cut on a char boundary
        assert_eq!(truncate_chars("héllo", 2), "hé...");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        // Port 9 (discard) would fail to connect; a Config error proves no call was made.
        let provider = OpenRouterProvider::new(ProviderConfig {
            api_key: None,
            base_url: "http://127.0.0.1:9".to_string(),
            default_model: None,
        });
        let messages = vec![ChatMessage::user("Hello")];
        let result = provider
            .complete(CompletionRequest {
                messages: &messages,
                options: CompletionOptions::default(),
            })
            .await;

        match result {
            Err(ProviderError::Config(msg)) => {
                assert_eq!(msg, "OPENROUTER_API_KEY is not configured on the server")
            }
            other => panic!("expected Config error, got {:?}", other),
        }
    }
}
