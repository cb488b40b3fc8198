//! MiniChat: a terminal chat client and the proxy it talks to.
//!
//! - `server`: axum proxy exposing `POST /api/chat`, holds the credential
//! - `inference`: completion provider abstraction and the OpenRouter adapter
//! - `api`: HTTP client the terminal UI uses to reach the proxy
//! - `core`: conversation state, actions, configuration
//! - `tui`: ratatui front end

pub mod api;
pub mod core;
pub mod inference;
pub mod server;
pub mod tui;

#[cfg(test)]
pub mod test_support;
