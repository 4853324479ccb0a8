//! Trait definitions for the Lakshya generation core.
//!
//! The generation core talks to three collaborators it does not own: the
//! hosted model, the document database, and the prompt templates. Each is
//! reached through a trait so callers inject real clients or fakes.

mod traits;
mod types;

pub use traits::{DocumentStore, FragmentStream, ModelBackend, PromptRenderer, ToolInvoker};
pub use types::{DocumentPath, Filter, FilterOp, Record};
