//! Core data types for the Lakshya generation core.
//!
//! This crate provides the data model shared by every flow: conversation
//! messages, generation requests and responses, the retry policy, and the
//! session transcript.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod attempt;
mod message;
mod output;
mod policy;
mod request;
mod role;
mod transcript;

pub use attempt::{AttemptOutcome, GenerationAttempt};
pub use message::{Message, Part};
pub use output::{Output, ToolCall};
pub use policy::{RetryPolicy, RetryPolicyBuilder, RetryPolicyBuilderError};
pub use request::{
    GenerationRequest, GenerationRequestBuilder, GenerationRequestBuilderError,
    GenerationResponse, Prompt, ToolDefinition,
};
pub use role::Role;
pub use transcript::ConversationTranscript;
