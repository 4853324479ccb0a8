//! Prompt template errors.

/// Template rendering error with source location.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Template Error: {} (template '{}') at line {} in {}", message, template_id, line, file)]
pub struct TemplateError {
    /// Template that failed to render
    pub template_id: String,
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl TemplateError {
    /// Create a new TemplateError at the current location.
    #[track_caller]
    pub fn new(template_id: impl Into<String>, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            template_id: template_id.into(),
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
