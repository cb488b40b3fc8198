use serde::{Deserialize, Serialize};

use crate::core::message::ChatMessage;

/// Body sent to the proxy.
#[derive(Serialize, Debug)]
pub struct ChatRequest<'a> {
    pub messages: &'a [ChatMessage],
}

/// Whatever the backend answered with. Our proxy fills `reply`; the other
/// fields let the client talk to backends that name the field differently.
#[derive(Deserialize, Debug, Default)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatResponse {
    /// First non-empty field in order `response`, `reply`, `text`, `message`.
    pub fn into_text(self) -> Option<String> {
        [self.response, self.reply, self.text, self.message]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
    }
}
