//! # Backend Proxy
//!
//! HTTP surface of MiniChat. A single stateless endpoint, `POST /api/chat`,
//! relays a message list to the completion provider and returns the reply.
//! The provider credential only ever lives in this process.

pub mod chat;
pub mod error;

use std::sync::Arc;

use axum::Router;
use axum::routing::post;
use log::{info, warn};

use crate::core::config::ResolvedConfig;
use crate::inference::{CompletionOptions, CompletionProvider, OpenRouterProvider};

pub const CHAT_ROUTE: &str = "/api/chat";

/// Shared state passed to all handlers. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn CompletionProvider>,
    pub options: CompletionOptions,
}

impl AppState {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            provider: Arc::new(OpenRouterProvider::new(config.provider.clone())),
            options: CompletionOptions {
                model: None,
                max_tokens: config.max_tokens,
                timeout: config.timeout,
            },
        }
    }
}

/// Builds the router with the chat route and shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            CHAT_ROUTE,
            post(chat::chat_handler).fallback(chat::method_not_allowed),
        )
        .with_state(state)
}

/// Binds `config.bind_addr` and serves until the process is stopped.
pub async fn serve(config: ResolvedConfig) -> std::io::Result<()> {
    if config.provider.api_key.is_none() {
        warn!("OPENROUTER_API_KEY is not set; every /api/chat call will fail until it is");
    }

    let state = AppState::from_config(&config);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(
        "MiniChat proxy listening on http://{} (POST {})",
        listener.local_addr()?,
        CHAT_ROUTE
    );

    axum::serve(listener, router(state)).await
}
