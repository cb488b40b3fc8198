//! # Conversation Store
//!
//! The ordered list of messages shown to the user. Insertion order is display
//! order. The list is only ever appended to or replaced wholesale, so what the
//! user sees always matches the order things were sent.
//!
//! ```text
//! Conversation + StoreAction  →  reduce()  →  Conversation
//! ```

use crate::core::message::ChatMessage;

/// The only two ways the message list may change.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    /// Add one message at the end.
    Append(ChatMessage),
    /// Replace the list with the given messages, or clear it when `None`.
    Reset(Option<Vec<ChatMessage>>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reduce(&mut self, action: StoreAction) {
        match action {
            StoreAction::Append(message) => self.messages.push(message),
            StoreAction::Reset(messages) => self.messages = messages.unwrap_or_default(),
        }
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.reduce(StoreAction::Append(message));
    }

    pub fn reset(&mut self, messages: Option<Vec<ChatMessage>>) {
        self.reduce(StoreAction::Reset(messages));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;

    #[test]
    fn test_new_conversation_is_empty() {
        let conv = Conversation::new();
        assert!(conv.is_empty());
        assert_eq!(conv.len(), 0);
    }

    #[test]
    fn test_append_preserves_call_order() {
        let mut conv = Conversation::new();
        let inputs = ["first", "second", "third", "fourth"];
        for (i, text) in inputs.iter().enumerate() {
            let msg = if i % 2 == 0 {
                ChatMessage::user(*text)
            } else {
                ChatMessage::assistant(*text)
            };
            conv.append(msg);
        }

        let contents: Vec<&str> = conv.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, inputs);
        assert_eq!(conv.messages()[1].role, Role::Assistant);
    }

    #[test]
    fn test_reset_without_list_clears() {
        let mut conv = Conversation::new();
        conv.append(ChatMessage::user("hello"));
        conv.append(ChatMessage::assistant("hi"));

        conv.reset(None);
        assert!(conv.is_empty());
    }

    #[test]
    fn test_reset_with_list_replaces_regardless_of_prior_state() {
        let replacement = vec![
            ChatMessage::system("be brief"),
            ChatMessage::user("restored"),
        ];

        let mut empty = Conversation::new();
        empty.reset(Some(replacement.clone()));
        assert_eq!(empty.messages(), replacement.as_slice());

        let mut busy = Conversation::new();
        busy.append(ChatMessage::user("old"));
        busy.append(ChatMessage::assistant("older"));
        busy.reset(Some(replacement.clone()));
        assert_eq!(busy.messages(), replacement.as_slice());
    }

    #[test]
    fn test_reduce_dispatches_both_actions() {
        let mut conv = Conversation::new();
        conv.reduce(StoreAction::Append(ChatMessage::user("a")));
        assert_eq!(conv.len(), 1);
        conv.reduce(StoreAction::Reset(None));
        assert!(conv.is_empty());
    }
}
