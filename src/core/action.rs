//! # Actions
//!
//! Everything that can happen in MiniChat becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! Backend responds? That's `Action::ReplyReceived(text)`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns an `Effect` describing any I/O the caller must
//! perform. No side effects here. I/O happens elsewhere.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use log::{debug, info, warn};

use crate::core::message::ChatMessage;
use crate::core::state::{App, Phase};

/// Shown in place of a reply when the backend call fails for any reason.
pub const BACKEND_APOLOGY: &str =
    "Sorry, I encountered an error connecting to the backend. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// User submitted the input text.
    Submit(String),
    /// Backend returned reply text.
    ReplyReceived(String),
    /// Backend call failed (transport, status, or parse).
    RequestFailed(String),
    /// "Clear chat": empty the conversation without confirmation.
    ClearChat,
    Quit,
}

/// I/O the event loop must perform after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Start a backend call with these messages.
    SendRequest(Vec<ChatMessage>),
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(text) => {
            if text.trim().is_empty() {
                debug!("Ignoring blank submit");
                return Effect::None;
            }
            if app.phase == Phase::Sending {
                debug!("Ignoring submit while a request is in flight");
                return Effect::None;
            }

            app.conversation.append(ChatMessage::user(text.clone()));
            app.phase = Phase::Sending;
            app.status_message = String::from("Waiting for reply...");
            info!(
                "Submitting message ({} chars, conversation now {} messages)",
                text.len(),
                app.conversation.len()
            );
            Effect::SendRequest(app.outgoing_messages(&text))
        }
        Action::ReplyReceived(reply) => {
            app.conversation.append(ChatMessage::assistant(reply));
            app.phase = Phase::Idle;
            app.status_message.clear();
            Effect::None
        }
        Action::RequestFailed(reason) => {
            warn!("Backend request failed: {}", reason);
            app.conversation.append(ChatMessage::assistant(BACKEND_APOLOGY));
            app.phase = Phase::Idle;
            app.status_message = String::from("Backend error");
            Effect::None
        }
        Action::ClearChat => {
            info!("Clearing conversation ({} messages)", app.conversation.len());
            app.conversation.reset(None);
            app.status_message = String::from("Chat cleared");
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;
    use crate::test_support::test_app;

    #[test]
    fn test_submit_appends_user_message_and_starts_sending() {
        let mut app = test_app();
        let effect = update(&mut app, Action::Submit("Hello".to_string()));

        assert_eq!(app.conversation.messages(), &[ChatMessage::user("Hello")]);
        assert_eq!(app.phase, Phase::Sending);
        match effect {
            Effect::SendRequest(messages) => {
                assert_eq!(messages.last(), Some(&ChatMessage::user("Hello")));
            }
            other => panic!("expected SendRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Submit("   \n".to_string())), Effect::None);
        assert!(app.conversation.is_empty());
        assert_eq!(app.phase, Phase::Idle);
    }

    #[test]
    fn test_submit_while_sending_is_ignored() {
        let mut app = test_app();
        update(&mut app, Action::Submit("first".to_string()));
        let effect = update(&mut app, Action::Submit("second".to_string()));

        assert_eq!(effect, Effect::None);
        assert_eq!(app.conversation.len(), 1);
        assert_eq!(app.conversation.messages()[0].content, "first");
    }

    #[test]
    fn test_reply_appends_assistant_message_and_returns_to_idle() {
        let mut app = test_app();
        update(&mut app, Action::Submit("Hello".to_string()));
        update(&mut app, Action::ReplyReceived("Hi there".to_string()));

        let messages = app.conversation.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1], ChatMessage::assistant("Hi there"));
        assert_eq!(app.phase, Phase::Idle);
    }

    #[test]
    fn test_failure_appends_apology_and_returns_to_idle() {
        let mut app = test_app();
        update(&mut app, Action::Submit("Hello".to_string()));
        update(
            &mut app,
            Action::RequestFailed("HTTP error! status: 500".to_string()),
        );

        let last = app.conversation.messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, BACKEND_APOLOGY);
        assert_eq!(app.phase, Phase::Idle);

        // Input is usable again after a failure
        let effect = update(&mut app, Action::Submit("retry".to_string()));
        assert!(matches!(effect, Effect::SendRequest(_)));
    }

    #[test]
    fn test_clear_chat_empties_conversation() {
        let mut app = test_app();
        update(&mut app, Action::Submit("Hello".to_string()));
        update(&mut app, Action::ReplyReceived("Hi".to_string()));

        assert_eq!(update(&mut app, Action::ClearChat), Effect::None);
        assert!(app.conversation.is_empty());
    }

    #[test]
    fn test_quit_returns_quit_effect() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Quit), Effect::Quit);
    }
}
