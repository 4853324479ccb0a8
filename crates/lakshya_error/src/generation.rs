//! Generation errors and retry classification.

/// HTTP status the model backend uses to signal rate limiting.
pub const RATE_LIMIT_STATUS: u16 = 429;

/// Error conditions observed while generating model output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GenerationErrorKind {
    /// Backend rejected the call because of rate limiting (HTTP 429)
    #[display("Rate limited: {}", _0)]
    RateLimited(String),

    /// Every attempt allowed by the retry policy was rate limited
    #[display("Retries exhausted after {} attempts, last rate limit: {}", attempts, last)]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Message of the last rate-limit response
        last: String,
    },

    /// Any non rate-limit failure from the model backend
    #[display("Backend failure (status {:?}): {}", status, message)]
    Backend {
        /// HTTP status, when the failure came from an HTTP response
        status: Option<u16>,
        /// Error message
        message: String,
    },

    /// The stream failed after it had started emitting fragments
    #[display("Stream interrupted after {} bytes: {}", partial.len(), cause)]
    StreamInterrupted {
        /// Text accumulated before the failure
        partial: String,
        /// Description of the failure
        cause: String,
    },

    /// Caller cancelled the operation
    #[display("Generation cancelled")]
    Cancelled,

    /// Request could not be built or sent
    #[display("Invalid request: {}", _0)]
    InvalidRequest(String),
}

impl GenerationErrorKind {
    /// Classify an HTTP status returned by the backend.
    ///
    /// # Examples
    ///
    /// ```
    /// use lakshya_error::GenerationErrorKind;
    ///
    /// let kind = GenerationErrorKind::from_status(429, "quota");
    /// assert!(kind.is_retryable());
    ///
    /// let kind = GenerationErrorKind::from_status(503, "overloaded");
    /// assert!(!kind.is_retryable());
    /// ```
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        if status == RATE_LIMIT_STATUS {
            GenerationErrorKind::RateLimited(message.into())
        } else {
            GenerationErrorKind::Backend {
                status: Some(status),
                message: message.into(),
            }
        }
    }

    /// Rate limiting is the only condition that triggers a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerationErrorKind::RateLimited(_))
    }

    /// Text accumulated before a stream interruption, if any.
    pub fn partial(&self) -> Option<&str> {
        match self {
            GenerationErrorKind::StreamInterrupted { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

/// Generation error with source location tracking.
///
/// # Examples
///
/// ```
/// use lakshya_error::{GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::Cancelled);
/// assert!(format!("{}", err).contains("cancelled"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The kind of error that occurred
    pub kind: GenerationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a backend failure without an HTTP status.
    #[track_caller]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Backend {
            status: None,
            message: message.into(),
        })
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GenerationErrorKind {
        &self.kind
    }
}

impl From<GenerationErrorKind> for GenerationError {
    #[track_caller]
    fn from(kind: GenerationErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Trait for errors that support retry logic.
///
/// # Examples
///
/// ```
/// use lakshya_error::{GenerationError, GenerationErrorKind, RetryableError};
///
/// let err = GenerationError::new(GenerationErrorKind::RateLimited("slow down".into()));
/// assert!(err.is_retryable());
///
/// let err = GenerationError::backend("bad request");
/// assert!(!err.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for GenerationError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Result type for generation operations.
pub type GenerationResult<T> = Result<T, GenerationError>;
