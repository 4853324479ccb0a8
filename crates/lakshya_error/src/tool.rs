//! Tool invocation errors.

/// Specific tool invocation failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ToolErrorKind {
    /// The model asked for a tool that is not registered
    #[display("Unknown tool: {}", _0)]
    UnknownTool(String),

    /// Tool arguments failed validation
    #[display("Invalid arguments for '{}': {}", tool, reason)]
    InvalidArguments {
        /// Tool name
        tool: String,
        /// Reason the arguments were rejected
        reason: String,
    },

    /// The lookup behind the tool failed
    #[display("Tool '{}' failed: {}", tool, reason)]
    Execution {
        /// Tool name
        tool: String,
        /// Failure description
        reason: String,
    },

    /// The model kept requesting tools past the allowed number of rounds
    #[display("Tool round limit of {} exceeded", _0)]
    RoundLimit(usize),
}

/// Tool error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Tool Error: {} at line {} in {}", kind, line, file)]
pub struct ToolError {
    /// The kind of error that occurred
    pub kind: ToolErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ToolError {
    /// Create a new tool error with caller location tracking.
    #[track_caller]
    pub fn new(kind: ToolErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
