//! Top-level error wrapper types.

use crate::{ConfigError, FlowError, GenerationError, StorageError, TemplateError, ToolError};

/// Every error condition the workspace can surface.
///
/// # Examples
///
/// ```
/// use lakshya_error::{LakshyaError, ConfigError};
///
/// let err: LakshyaError = ConfigError::new("bad value").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum LakshyaErrorKind {
    /// Model generation error
    #[from(GenerationError)]
    Generation(GenerationError),
    /// Document store error
    #[from(StorageError)]
    Storage(StorageError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Prompt template error
    #[from(TemplateError)]
    Template(TemplateError),
    /// Tool invocation error
    #[from(ToolError)]
    Tool(ToolError),
    /// Structured flow error
    #[from(FlowError)]
    Flow(FlowError),
}

/// Lakshya error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Lakshya Error: {}", _0)]
pub struct LakshyaError(Box<LakshyaErrorKind>);

impl LakshyaError {
    /// Create a new error from a kind.
    pub fn new(kind: LakshyaErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &LakshyaErrorKind {
        &self.0
    }

    /// The generation error inside, if this wraps one.
    pub fn as_generation(&self) -> Option<&GenerationError> {
        match self.kind() {
            LakshyaErrorKind::Generation(err) => Some(err),
            _ => None,
        }
    }
}

impl<T> From<T> for LakshyaError
where
    T: Into<LakshyaErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Lakshya operations.
pub type LakshyaResult<T> = std::result::Result<T, LakshyaError>;
