//! `POST /api/chat`: validate, forward to the completion provider, return the reply.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::Method;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::message::ChatMessage;
use crate::inference::CompletionRequest;
use crate::server::AppState;
use crate::server::error::{ApiError, ApiResult};

pub const MISSING_MESSAGES: &str =
    "Invalid request: expected JSON body with `messages` array.";
pub const INVALID_MESSAGE_SHAPE: &str =
    "Invalid request: each message must be { role: string, content: string }.";

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Parses and validates a request body into the message list.
///
/// The body must be a JSON object with a `messages` array, and every element
/// must itself be an object. Serde would otherwise accept a JSON array in
/// place of a struct.
pub fn parse_messages(body: &[u8]) -> ApiResult<Vec<ChatMessage>> {
    let missing = || ApiError::BadRequest(MISSING_MESSAGES.to_string());
    let value: Value = serde_json::from_slice(body).map_err(|_| missing())?;
    let elements = value
        .as_object()
        .and_then(|body| body.get("messages"))
        .and_then(Value::as_array)
        .ok_or_else(missing)?;

    elements
        .iter()
        .map(|element| {
            let invalid = || ApiError::BadRequest(INVALID_MESSAGE_SHAPE.to_string());
            if !element.is_object() {
                return Err(invalid());
            }
            ChatMessage::deserialize(element).map_err(|_| invalid())
        })
        .collect()
}

pub async fn chat_handler(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<ChatReply>> {
    let messages = parse_messages(&body).inspect_err(|e| {
        warn!("Rejected /api/chat request: {}", e);
    })?;

    info!(
        "POST /api/chat: {} message(s), provider={}",
        messages.len(),
        state.provider.name()
    );

    let request = CompletionRequest {
        messages: &messages,
        options: state.options.clone(),
    };

    match state.provider.complete(request).await {
        Ok(reply) => Ok(Json(ChatReply { reply })),
        Err(e) => {
            error!("Error in /api/chat: {:?}", e);
            Err(ApiError::Upstream(e))
        }
    }
}

/// Answers every non-POST method on `/api/chat`.
pub async fn method_not_allowed(method: Method) -> ApiError {
    warn!("Rejected {} /api/chat", method);
    ApiError::MethodNotAllowed
}
