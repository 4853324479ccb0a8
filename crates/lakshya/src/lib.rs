//! Lakshya360 career guidance core.
//!
//! Lakshya provides the AI layer of the Lakshya360 (Disha Path) career
//! guidance app: a streaming career-counselor chat and a set of single-shot
//! generation flows (day in the life, future pathways, college finder,
//! personalized recommendations, quiz-based suggestions). Every model call
//! goes through one [`ResilientGenerationClient`] that retries HTTP 429
//! responses with exponential backoff and fails fast on everything else.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lakshya::{AppContext, CancellationToken, LakshyaConfig, StudentProfile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = AppContext::from_config(LakshyaConfig::load()?)?;
//!     let mut chat = app.chat(StudentProfile::default(), "session-1").await?;
//!
//!     let turn = chat
//!         .send_turn("Which exams lead to architecture?", |s| println!("{s}"), &CancellationToken::new())
//!         .await;
//!     println!("{}", turn.reply);
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `gemini` (default) - Google Gemini REST backend
//! - `api` - gate tests that call the real API
//!
//! # Architecture
//!
//! - `lakshya_error` - error types
//! - `lakshya_core` - requests, responses, retry policy, transcripts
//! - `lakshya_interface` - backend, store, renderer and tool traits
//! - `lakshya_rate_limit` - the resilient client and configuration
//! - `lakshya_storage` - document stores
//! - `lakshya_models` - model backends
//! - `lakshya_flows` - chat, tools and structured flows
//!
//! This crate re-exports the pieces an application needs.

mod app;
mod telemetry;

pub use app::{AppContext, open_store};
pub use telemetry::init_telemetry;

pub use lakshya_core::*;
pub use lakshya_error::*;
pub use lakshya_interface::*;

pub use lakshya_flows::flows;
pub use lakshya_flows::{
    ChatTurn, CounselorChat, Flow, FlowKind, FlowRunner, StreamAccumulator, StudentProfile,
    TemplateRenderer, ToolName, ToolRegistry, TurnStatus, extract_json, spawn_accumulator,
};
pub use lakshya_models::{ScriptedBackend, ScriptedReply, StreamStep};
#[cfg(feature = "gemini")]
pub use lakshya_models::GeminiBackend;
pub use lakshya_rate_limit::{
    CancellationToken, ChatConfig, LakshyaConfig, ModelConfig, ResilientGenerationClient,
    StorageConfig,
};
pub use lakshya_storage::{FileDocumentStore, InMemoryDocumentStore};
