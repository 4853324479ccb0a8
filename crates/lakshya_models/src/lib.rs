//! Model backends for the Lakshya generation core.
//!
//! Each backend implements [`ModelBackend`](lakshya_interface::ModelBackend)
//! and is constructed explicitly by the caller, then injected into the
//! resilient client.
//!
//! # Available Backends
//!
//! - **Gemini** (Google) - REST backend, enabled by the default `gemini` feature
//! - **Scripted** - deterministic in-process backend for tests and demos
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "gemini")]
//! # {
//! use lakshya_models::GeminiBackend;
//! use lakshya_interface::ModelBackend;
//! use lakshya_core::GenerationRequest;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = GeminiBackend::from_env("GEMINI_API_KEY", "gemini-2.0-flash")?;
//! let response = backend.generate(&GenerationRequest::from_text("Hello")).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod scripted;

#[cfg(feature = "gemini")]
mod gemini;

pub use scripted::{RecordedCall, ScriptedBackend, ScriptedReply, StreamStep};

#[cfg(feature = "gemini")]
pub use gemini::{
    GeminiBackend, GeminiCandidate, GeminiContent, GeminiFunctionCall, GeminiFunctionResponse,
    GeminiPart, GeminiRequest, GeminiResponse, SseDecoder,
};
