//! Conversation state for the streaming chat panels

use crate::state::{ChatMessage, ChatRole, ImageAttachment};

/// Shown in place of a chat reply that failed before producing any text
pub const ERROR_REPLY: &str = "I encountered an error. Please try again.";
/// Same for the coding assistant
pub const CODING_ERROR_REPLY: &str = "// Error: Could not generate code.";

/// Everything needed to issue the request for a turn just recorded
#[derive(Debug, Clone)]
pub struct PendingTurn {
    /// Prior turns to send as context
    pub history: Vec<ChatMessage>,
    pub message: String,
    pub images: Vec<ImageAttachment>,
    /// Id of the empty model message that fragments are appended to
    pub reply_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    has_greeting: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a model greeting that is shown but never sent as history.
    pub fn with_greeting(text: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::model(text)],
            has_greeting: true,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// True until the user has sent anything.
    pub fn is_fresh(&self) -> bool {
        !self.messages.iter().any(|m| m.role == ChatRole::User)
    }

    /// Record a user turn plus an empty reply placeholder.
    pub fn send(&mut self, text: impl Into<String>, images: Vec<ImageAttachment>) -> PendingTurn {
        let history = self.history();
        let user = ChatMessage::user(text, images);
        let reply = ChatMessage::model("");

        let turn = PendingTurn {
            history,
            message: user.text.clone(),
            images: user.images.clone(),
            reply_id: reply.id.clone(),
        };
        self.messages.push(user);
        self.messages.push(reply);
        turn
    }

    fn history(&self) -> Vec<ChatMessage> {
        let skip = usize::from(self.has_greeting);
        self.messages
            .iter()
            .skip(skip)
            .filter(|m| !m.is_error && !(m.role == ChatRole::Model && m.text.is_empty()))
            .cloned()
            .collect()
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut ChatMessage> {
        self.messages.iter_mut().rev().find(|m| m.id == id)
    }

    /// Extend a streaming reply. Returns false if the id is unknown.
    pub fn append_chunk(&mut self, id: &str, fragment: &str) -> bool {
        match self.find_mut(id) {
            Some(message) => {
                message.text.push_str(fragment);
                true
            }
            None => false,
        }
    }

    /// Flag a reply as failed. Partial text is kept; an empty reply shows
    /// `fallback` instead.
    pub fn mark_error(&mut self, id: &str, fallback: &str) {
        if let Some(message) = self.find_mut(id) {
            message.is_error = true;
            if message.text.is_empty() {
                message.text = fallback.to_string();
            }
        }
    }

    /// Close a stream. A reply that never received text stays in place,
    /// flagged as errored with `fallback`. Returns false in that case.
    pub fn finish(&mut self, id: &str, fallback: &str) -> bool {
        let Some(message) = self.find_mut(id) else {
            return false;
        };
        if message.role == ChatRole::Model && message.text.is_empty() {
            message.is_error = true;
            message.text = fallback.to_string();
            return false;
        }
        true
    }
}
