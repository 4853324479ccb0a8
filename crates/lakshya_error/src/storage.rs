//! Document store error types.

/// Kinds of document store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to create storage directory
    #[display("Failed to create storage directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write a document
    #[display("Failed to write document: {}", _0)]
    Write(String),
    /// Failed to read a document
    #[display("Failed to read document: {}", _0)]
    Read(String),
    /// Document not found at the specified path
    #[display("Document not found: {}", _0)]
    NotFound(String),
    /// Invalid document path
    #[display("Invalid document path: {}", _0)]
    InvalidPath(String),
    /// Document could not be (de)serialized
    #[display("Serialization error: {}", _0)]
    Serialization(String),
    /// Storage backend is unavailable
    #[display("Storage unavailable: {}", _0)]
    Unavailable(String),
}

/// Document store error with location tracking.
///
/// # Examples
///
/// ```
/// use lakshya_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound("colleges/iit-b".to_string()));
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Result type for document store operations.
pub type StorageResult<T> = Result<T, StorageError>;
