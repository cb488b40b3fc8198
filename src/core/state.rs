//! # Application State
//!
//! Core business state for MiniChat. Domain logic only, no TUI-specific
//! types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── conversation: Conversation   // ordered message list
//! ├── phase: Phase                 // Idle | Sending
//! ├── status_message: String       // status bar text
//! ├── backend_url: String          // where the proxy lives
//! ├── system_prompt: String        // prepended to every request
//! └── send_full_history: bool      // transcript vs latest utterance
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use crate::core::config::ResolvedConfig;
use crate::core::conversation::Conversation;
use crate::core::message::ChatMessage;

/// Request lifecycle of the controller. `Sending` is the in-flight guard:
/// a submit is only accepted from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Sending,
}

pub struct App {
    pub conversation: Conversation,
    pub phase: Phase,
    pub status_message: String,
    pub backend_url: String,
    pub system_prompt: String,
    pub send_full_history: bool,
}

impl App {
    pub fn new(backend_url: String, system_prompt: String) -> Self {
        Self {
            conversation: Conversation::new(),
            phase: Phase::Idle,
            status_message: String::from("Welcome to MiniChat!"),
            backend_url,
            system_prompt,
            send_full_history: false,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        let mut app = Self::new(config.backend_url.clone(), config.system_prompt.clone());
        app.send_full_history = config.send_full_history;
        app
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Sending
    }

    /// Builds the message list sent to the backend for a submit of `latest`.
    ///
    /// By default only the system prompt and the latest utterance go out, so
    /// the model sees no earlier turns. With `send_full_history` the whole
    /// transcript is sent instead; the transcript already ends with `latest`.
    pub fn outgoing_messages(&self, latest: &str) -> Vec<ChatMessage> {
        let mut out = Vec::new();
        if !self.system_prompt.trim().is_empty() {
            out.push(ChatMessage::system(self.system_prompt.clone()));
        }
        if self.send_full_history {
            out.extend(self.conversation.messages().iter().cloned());
        } else {
            out.push(ChatMessage::user(latest));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;
    use crate::test_support::test_app;

    #[test]
    fn test_app_new_defaults() {
        let app = test_app();
        assert_eq!(app.status_message, "Welcome to MiniChat!");
        assert_eq!(app.phase, Phase::Idle);
        assert!(!app.is_loading());
        assert!(app.conversation.is_empty());
        assert!(!app.send_full_history);
    }

    #[test]
    fn test_outgoing_messages_sends_only_latest_by_default() {
        let mut app = test_app();
        app.conversation.append(ChatMessage::user("earlier"));
        app.conversation.append(ChatMessage::assistant("earlier reply"));
        app.conversation.append(ChatMessage::user("now"));

        let out = app.outgoing_messages("now");
        assert_eq!(
            out,
            vec![
                ChatMessage::system("You are a helpful assistant."),
                ChatMessage::user("now"),
            ]
        );
    }

    #[test]
    fn test_outgoing_messages_full_history() {
        let mut app = test_app();
        app.send_full_history = true;
        app.conversation.append(ChatMessage::user("earlier"));
        app.conversation.append(ChatMessage::assistant("earlier reply"));
        app.conversation.append(ChatMessage::user("now"));

        let out = app.outgoing_messages("now");
        assert_eq!(out.len(), 4);
        assert_eq!(out[0].role, Role::System);
        assert_eq!(out[3], ChatMessage::user("now"));
    }

    #[test]
    fn test_outgoing_messages_skips_blank_system_prompt() {
        let mut app = test_app();
        app.system_prompt = "   ".to_string();
        let out = app.outgoing_messages("hi");
        assert_eq!(out, vec![ChatMessage::user("hi")]);
    }
}
