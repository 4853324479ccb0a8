//! Output types from model responses.

use serde::{Deserialize, Serialize};

/// Output produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Output {
    /// Plain text output.
    Text(String),

    /// Structured JSON output.
    Json(serde_json::Value),

    /// Tool calls requested by the model.
    ///
    /// The results should be sent back in a subsequent request.
    ToolCalls(Vec<ToolCall>),
}

/// A tool call made by the model.
///
/// # Examples
///
/// ```
/// use lakshya_core::ToolCall;
/// use serde_json::json;
///
/// let call = ToolCall {
///     id: "call_1".to_string(),
///     name: "find_colleges".to_string(),
///     arguments: json!({"city": "Pune"}),
/// };
///
/// assert_eq!(call.name, "find_colleges");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool to call
    pub name: String,
    /// Arguments to pass to the tool (as JSON)
    pub arguments: serde_json::Value,
}
