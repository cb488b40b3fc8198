//! # Core Application Logic
//!
//! This module contains MiniChat's business logic.
//! It knows nothing about any specific UI technology or HTTP framework.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Conversation (store) │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No UI. No network.     │
//!                    └───────────┬─────────────┘
//!                                │
//!                  ┌─────────────┴─────────────┐
//!                  ▼                           ▼
//!           ┌────────────┐              ┌────────────┐
//!           │    TUI     │              │  Backend   │
//!           │  Adapter   │─── HTTP ────▶│   proxy    │
//!           │ (ratatui)  │              │  (axum)    │
//!           └────────────┘              └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`message`]: `ChatMessage` and `Role`
//! - [`conversation`]: the append/reset message store
//! - [`state`]: The `App` struct, all controller state in one place
//! - [`action`]: The `Action` enum and `update()`
//! - [`config`]: layered configuration (file, env, CLI)

pub mod action;
pub mod config;
pub mod conversation;
pub mod message;
pub mod state;

pub use message::{ChatMessage, Role};
