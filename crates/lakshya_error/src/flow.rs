//! Flow execution errors.

/// Specific error conditions for structured flows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum FlowErrorKind {
    /// Flow input could not be turned into template variables
    #[display("Invalid input for flow '{}': {}", flow, reason)]
    InvalidInput {
        /// Flow identifier
        flow: String,
        /// Reason the input was rejected
        reason: String,
    },

    /// The model reply did not contain JSON
    #[display("No JSON found in reply to flow '{}' (length: {})", flow, length)]
    MissingJson {
        /// Flow identifier
        flow: String,
        /// Reply length in bytes
        length: usize,
    },

    /// The model reply did not match the flow output schema
    #[display("Output of flow '{}' failed validation: {}", flow, reason)]
    InvalidOutput {
        /// Flow identifier
        flow: String,
        /// Reason the output was rejected
        reason: String,
    },

    /// No flow is registered under the name
    #[display("Unknown flow: {}", _0)]
    UnknownFlow(String),
}

/// Error type for flow operations.
///
/// # Examples
///
/// ```
/// use lakshya_error::{FlowError, FlowErrorKind};
///
/// let err = FlowError::new(FlowErrorKind::UnknownFlow("horoscope".into()));
/// assert!(format!("{}", err).contains("horoscope"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Flow Error: {} at line {} in {}", kind, line, file)]
pub struct FlowError {
    /// The kind of error that occurred
    pub kind: FlowErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl FlowError {
    /// Create a new flow error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: FlowErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
