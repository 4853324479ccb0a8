//! Conversation transcript for a chat session.

use crate::{Message, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordered, append-only message history of one session.
///
/// The transcript is owned by its session. Persisting it takes a copy via
/// [`ConversationTranscript::snapshot`]; the in-memory value keeps growing
/// independently of the stored one.
///
/// # Examples
///
/// ```
/// use lakshya_core::{ConversationTranscript, Message, Role};
///
/// let mut transcript = ConversationTranscript::new("session-1");
/// transcript.push(Message::with_text(Role::User, "Hi"));
/// let saved = transcript.snapshot();
/// transcript.push(Message::with_text(Role::Assistant, "Hello!"));
///
/// assert_eq!(saved.len(), 1);
/// assert_eq!(transcript.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTranscript {
    session_id: String,
    messages: Vec<Message>,
    updated_at: DateTime<Utc>,
}

impl ConversationTranscript {
    /// Start an empty transcript.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Session this transcript belongs to.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// All messages in order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Time of the last append.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether no message has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// The last `limit` messages, oldest first.
    pub fn recent(&self, limit: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(limit);
        &self.messages[start..]
    }

    /// Last message written by `role`.
    pub fn last_from(&self, role: Role) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == role)
    }

    /// Independent copy for persistence.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }
}
