//! Error types for the Lakshya generation core.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use lakshya_error::{ConfigError, LakshyaResult};
//!
//! fn load() -> LakshyaResult<String> {
//!     Err(ConfigError::new("Missing [retry] section"))?
//! }
//!
//! assert!(load().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod flow;
mod generation;
mod storage;
mod template;
mod tool;

pub use config::ConfigError;
pub use error::{LakshyaError, LakshyaErrorKind, LakshyaResult};
pub use flow::{FlowError, FlowErrorKind};
pub use generation::{
    GenerationError, GenerationErrorKind, GenerationResult, RATE_LIMIT_STATUS, RetryableError,
};
pub use storage::{StorageError, StorageErrorKind, StorageResult};
pub use template::TemplateError;
pub use tool::{ToolError, ToolErrorKind};
