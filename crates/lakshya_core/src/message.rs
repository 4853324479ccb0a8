//! Message types for conversation history.

use crate::{Role, ToolCall};
use serde::{Deserialize, Serialize};

/// One piece of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Part {
    /// Plain text.
    Text(String),

    /// A tool invocation requested by the model.
    ToolCall(ToolCall),

    /// The result of running a tool, sent back to the model.
    ToolResult {
        /// Identifier of the call this answers
        id: String,
        /// Tool name
        name: String,
        /// Tool output as JSON
        output: serde_json::Value,
    },
}

/// A message in a conversation.
///
/// # Examples
///
/// ```
/// use lakshya_core::{Message, Role};
///
/// let message = Message::with_text(Role::User, "Which stream suits me after 10th?");
/// assert_eq!(message.role, Role::User);
/// assert_eq!(message.text(), "Which stream suits me after 10th?");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender
    pub role: Role,
    /// The content of the message
    pub content: Vec<Part>,
}

impl Message {
    /// Build a single-part text message.
    pub fn with_text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![Part::Text(text.into())],
        }
    }

    /// Concatenated text parts of the message.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                Part::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Tool calls carried by the message.
    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.content.iter().filter_map(|part| match part {
            Part::ToolCall(call) => Some(call),
            _ => None,
        })
    }
}
