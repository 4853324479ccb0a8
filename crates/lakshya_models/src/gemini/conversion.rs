//! Type conversions between Lakshya and Gemini types.

use super::dto::{
    GeminiContent, GeminiErrorBody, GeminiFunctionCall, GeminiFunctionDeclaration,
    GeminiFunctionResponse, GeminiGenerationConfig, GeminiPart, GeminiRequest, GeminiResponse,
    GeminiTool,
};
use lakshya_core::{GenerationRequest, GenerationResponse, Output, Part, Role, ToolCall};
use lakshya_error::{GenerationError, GenerationErrorKind, GenerationResult};

/// Converts a Lakshya request to a Gemini request body.
///
/// System messages become the system instruction; tool results travel as
/// `functionResponse` parts of a user turn.
pub fn to_gemini_request(
    request: &GenerationRequest,
    defaults: &GeminiGenerationConfig,
) -> GeminiRequest {
    let mut system_parts = Vec::new();
    let mut contents = Vec::new();

    for message in request.messages() {
        if message.role == Role::System {
            system_parts.extend(message.content.iter().filter_map(|part| match part {
                Part::Text(text) => Some(GeminiPart::text(text.clone())),
                _ => None,
            }));
            continue;
        }

        let role = match message.role {
            Role::Assistant => "model",
            _ => "user",
        };
        let parts = message.content.iter().map(to_gemini_part).collect();
        contents.push(GeminiContent {
            role: Some(role.to_string()),
            parts,
        });
    }

    let system_instruction = (!system_parts.is_empty()).then(|| GeminiContent {
        role: None,
        parts: system_parts,
    });

    let tools = if request.tools().is_empty() {
        Vec::new()
    } else {
        vec![GeminiTool {
            function_declarations: request
                .tools()
                .iter()
                .map(|tool| GeminiFunctionDeclaration {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.parameters.clone(),
                })
                .collect(),
        }]
    };

    let generation_config = GeminiGenerationConfig {
        temperature: (*request.temperature()).or(defaults.temperature),
        max_output_tokens: (*request.max_tokens()).or(defaults.max_output_tokens),
    };
    let generation_config = (generation_config != GeminiGenerationConfig::default())
        .then_some(generation_config);

    GeminiRequest::new(contents, system_instruction, tools, generation_config)
}

fn to_gemini_part(part: &Part) -> GeminiPart {
    match part {
        Part::Text(text) => GeminiPart::text(text.clone()),
        Part::ToolCall(call) => GeminiPart {
            function_call: Some(GeminiFunctionCall {
                name: call.name.clone(),
                args: call.arguments.clone(),
            }),
            ..GeminiPart::default()
        },
        Part::ToolResult { name, output, .. } => GeminiPart {
            function_response: Some(GeminiFunctionResponse {
                name: name.clone(),
                response: serde_json::json!({ "content": output }),
            }),
            ..GeminiPart::default()
        },
    }
}

/// Converts a Gemini response to a Lakshya response.
///
/// # Errors
///
/// Returns a backend error when the response has no candidate content,
/// which is how Gemini reports blocked prompts.
pub fn from_gemini_response(response: &GeminiResponse) -> GenerationResult<GenerationResponse> {
    let content = response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .ok_or_else(|| {
            let reason = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .or_else(|| response.prompt_feedback.as_ref().map(|f| f.to_string()))
                .unwrap_or_else(|| "no candidates".to_string());
            GenerationError::backend(format!("Gemini returned no content: {}", reason))
        })?;

    let mut text = String::new();
    let mut calls = Vec::new();
    for part in &content.parts {
        if let Some(fragment) = &part.text {
            text.push_str(fragment);
        }
        if let Some(call) = &part.function_call {
            calls.push(ToolCall {
                id: format!("{}-{}", call.name, calls.len()),
                name: call.name.clone(),
                arguments: call.args.clone(),
            });
        }
    }

    let mut outputs = Vec::new();
    if !text.is_empty() {
        outputs.push(Output::Text(text));
    }
    if !calls.is_empty() {
        outputs.push(Output::ToolCalls(calls));
    }
    Ok(GenerationResponse { outputs })
}

/// Text carried by one SSE event payload.
///
/// Events without text (usage metadata, finish markers) yield `None`.
///
/// # Errors
///
/// Returns a backend error when the payload is not a Gemini response.
pub fn fragment_from_event(data: &str) -> GenerationResult<Option<String>> {
    let response: GeminiResponse = serde_json::from_str(data).map_err(|e| {
        GenerationError::backend(format!("Failed to parse stream event: {}", e))
    })?;

    let text: String = response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect()
        })
        .unwrap_or_default();

    Ok((!text.is_empty()).then_some(text))
}

/// Classifies a non-success HTTP response.
///
/// 429 maps to the retryable rate-limit kind; every other status is a
/// backend failure.
pub fn error_from_status(status: u16, body: &str) -> GenerationErrorKind {
    let message = serde_json::from_str::<GeminiErrorBody>(body)
        .map(|parsed| match parsed.error.status {
            Some(code) => format!("{}: {}", code, parsed.error.message),
            None => parsed.error.message,
        })
        .unwrap_or_else(|_| body.trim().to_string());
    GenerationErrorKind::from_status(status, message)
}
