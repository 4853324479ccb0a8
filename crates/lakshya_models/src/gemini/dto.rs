//! Wire types for the Gemini `generateContent` REST API.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiFunctionCall {
    /// Function name
    pub name: String,
    /// Arguments object
    #[serde(default)]
    pub args: serde_json::Value,
}

/// Result of a function call, sent back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiFunctionResponse {
    /// Function name
    pub name: String,
    /// Result object
    pub response: serde_json::Value,
}

/// One part of a content block. Exactly one field is set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPart {
    /// Text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Function call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<GeminiFunctionCall>,
    /// Function result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<GeminiFunctionResponse>,
}

impl GeminiPart {
    /// Text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

/// A turn of content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeminiContent {
    /// `user` or `model`; absent on system instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Parts in order
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// Function declarations offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiTool {
    /// Declarations
    pub function_declarations: Vec<GeminiFunctionDeclaration>,
}

/// One function the model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiFunctionDeclaration {
    /// Function name
    pub name: String,
    /// What the function does
    pub description: String,
    /// JSON schema of the arguments
    pub parameters: serde_json::Value,
}

/// Sampling settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Output token cap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

/// Request body for `generateContent` and `streamGenerateContent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// Conversation turns
    contents: Vec<GeminiContent>,
    /// System prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    /// Tool declarations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
    /// Sampling settings
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

impl GeminiRequest {
    pub(crate) fn new(
        contents: Vec<GeminiContent>,
        system_instruction: Option<GeminiContent>,
        tools: Vec<GeminiTool>,
        generation_config: Option<GeminiGenerationConfig>,
    ) -> Self {
        Self {
            contents,
            system_instruction,
            tools,
            generation_config,
        }
    }
}

/// One candidate completion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    /// Generated content; absent when blocked
    #[serde(default)]
    pub content: Option<GeminiContent>,
    /// Why generation stopped
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Response body (also the payload of every SSE event).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    /// Candidates; the first one is used
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    /// Present when the prompt itself was blocked
    #[serde(default)]
    pub prompt_feedback: Option<serde_json::Value>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GeminiErrorBody {
    pub error: GeminiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GeminiErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}
