//! Trait definitions for the model backend and its collaborators.

use crate::{DocumentPath, Filter, Record};
use async_trait::async_trait;
use futures_util::stream::Stream;
use lakshya_core::{GenerationRequest, GenerationResponse, ToolCall, ToolDefinition};
use lakshya_error::{GenerationResult, StorageResult, TemplateError, ToolError};
use std::pin::Pin;

/// Lazy, finite sequence of text fragments from a streaming generation.
///
/// The stream ends when the upstream generation completes. It cannot be
/// restarted; issue a new request to regenerate.
pub type FragmentStream = Pin<Box<dyn Stream<Item = GenerationResult<String>> + Send>>;

/// Hosted model the generation core calls.
///
/// Implementations report rate limiting as
/// [`GenerationErrorKind::RateLimited`](lakshya_error::GenerationErrorKind::RateLimited)
/// and every other failure as a non-retryable kind.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Generate a complete response.
    async fn generate(&self, req: &GenerationRequest) -> GenerationResult<GenerationResponse>;

    /// Open a stream of text fragments.
    ///
    /// Errors returned here happen before any fragment is emitted; errors
    /// yielded by the stream happen after.
    async fn generate_stream(&self, req: &GenerationRequest) -> GenerationResult<FragmentStream>;

    /// Provider name (e.g., "gemini").
    fn provider_name(&self) -> &'static str;

    /// Default model identifier.
    fn model_name(&self) -> &str;
}

/// Collection-oriented document database.
///
/// Writes are per document and idempotent by overwrite; no operation spans
/// more than one document.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Records in `collection` matching every filter, up to `limit`.
    ///
    /// Results are ordered by document id.
    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        limit: Option<usize>,
    ) -> StorageResult<Vec<Record>>;

    /// Fetch one record, `None` when absent.
    async fn get_record(&self, path: &DocumentPath) -> StorageResult<Option<Record>>;

    /// Insert a record under a generated id and return its path.
    async fn add_record(
        &self,
        collection: &str,
        data: serde_json::Value,
    ) -> StorageResult<DocumentPath>;

    /// Create or overwrite the record at `path`.
    async fn set_record(&self, path: &DocumentPath, data: serde_json::Value) -> StorageResult<()>;

    /// Delete the record at `path`. Deleting a missing record succeeds.
    async fn delete_record(&self, path: &DocumentPath) -> StorageResult<()>;
}

/// Renders prompt templates.
///
/// Rendering is deterministic: identical inputs give identical output.
pub trait PromptRenderer: Send + Sync {
    /// Render `template_id` with `variables` (a JSON object).
    fn render(
        &self,
        template_id: &str,
        variables: &serde_json::Value,
    ) -> Result<String, TemplateError>;
}

/// Structured lookups the model may request mid-generation.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Declarations sent to the model.
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Validate the call's arguments and run it.
    async fn invoke(&self, call: &ToolCall) -> Result<serde_json::Value, ToolError>;
}
