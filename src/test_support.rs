//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crate::core::config::{DEFAULT_BACKEND_URL, DEFAULT_SYSTEM_PROMPT};
use crate::core::state::App;

/// Creates an idle App pointed at the default local backend.
pub fn test_app() -> App {
    App::new(
        DEFAULT_BACKEND_URL.to_string(),
        DEFAULT_SYSTEM_PROMPT.to_string(),
    )
}
