//! Request and response types for model generation.

use crate::{Message, Output, Part, Role, ToolCall};
use serde::{Deserialize, Serialize};

/// A rendered prompt, ready to send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::From)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Prompt {
    /// A single user turn of plain text.
    Text(String),
    /// A full message list (history, instructions, tool results).
    Messages(Vec<Message>),
}

impl Prompt {
    /// View the prompt as a message list.
    ///
    /// Plain text becomes a single user message.
    pub fn to_messages(&self) -> Vec<Message> {
        match self {
            Prompt::Text(text) => vec![Message::with_text(Role::User, text.clone())],
            Prompt::Messages(messages) => messages.clone(),
        }
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Prompt::Text(text.to_string())
    }
}

/// Definition of a tool the model may call during generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Name of the tool
    pub name: String,
    /// Human-readable description of what the tool does
    pub description: String,
    /// JSON Schema defining the parameters this tool accepts
    pub parameters: serde_json::Value,
}

/// Immutable generation request.
///
/// # Examples
///
/// ```
/// use lakshya_core::{GenerationRequest, Prompt};
///
/// let request = GenerationRequest::builder()
///     .prompt(Prompt::Text("Describe a day as a marine biologist".into()))
///     .model(Some("gemini-2.0-flash".to_string()))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.model().as_deref(), Some("gemini-2.0-flash"));
/// assert!(request.tools().is_empty());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_builder::Builder,
    derive_getters::Getters,
)]
#[builder(setter(into))]
pub struct GenerationRequest {
    /// The rendered prompt
    prompt: Prompt,
    /// Model identifier; the backend default is used when absent
    #[builder(default)]
    model: Option<String>,
    /// Tools the model may invoke
    #[builder(default)]
    #[serde(default)]
    tools: Vec<ToolDefinition>,
    /// Sampling temperature
    #[builder(default)]
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[builder(default)]
    max_tokens: Option<u32>,
}

impl GenerationRequest {
    /// Creates a new request builder.
    pub fn builder() -> GenerationRequestBuilder {
        GenerationRequestBuilder::default()
    }

    /// Plain-text request with backend defaults.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            prompt: Prompt::Text(text.into()),
            model: None,
            tools: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// The prompt as a message list.
    pub fn messages(&self) -> Vec<Message> {
        self.prompt.to_messages()
    }

    /// Copy of this request with a different prompt, keeping model and tools.
    pub fn with_prompt(&self, prompt: Prompt) -> Self {
        Self {
            prompt,
            ..self.clone()
        }
    }

    /// Copy of this request offering `tools` to the model.
    pub fn with_tools(&self, tools: Vec<ToolDefinition>) -> Self {
        Self {
            tools,
            ..self.clone()
        }
    }
}

/// The payload of a completed generation.
///
/// # Examples
///
/// ```
/// use lakshya_core::{GenerationResponse, Output};
///
/// let response = GenerationResponse {
///     outputs: vec![Output::Text("Hello! ".into()), Output::Text("How can I help?".into())],
/// };
///
/// assert_eq!(response.text(), "Hello! How can I help?");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GenerationResponse {
    /// The generated outputs from the model
    pub outputs: Vec<Output>,
}

impl GenerationResponse {
    /// Response holding a single text output.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            outputs: vec![Output::Text(text.into())],
        }
    }

    /// Concatenated text outputs.
    pub fn text(&self) -> String {
        self.outputs
            .iter()
            .filter_map(|output| match output {
                Output::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every tool call requested across outputs.
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.outputs
            .iter()
            .filter_map(|output| match output {
                Output::ToolCalls(calls) => Some(calls.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// The response as an assistant message for the transcript.
    pub fn to_message(&self) -> Message {
        let mut content = Vec::new();
        for output in &self.outputs {
            match output {
                Output::Text(text) => content.push(Part::Text(text.clone())),
                Output::Json(value) => content.push(Part::Text(value.to_string())),
                Output::ToolCalls(calls) => {
                    content.extend(calls.iter().cloned().map(Part::ToolCall));
                }
            }
        }
        Message {
            role: Role::Assistant,
            content,
        }
    }
}
