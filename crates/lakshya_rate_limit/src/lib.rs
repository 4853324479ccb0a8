//! Resilient model calls and runtime configuration.
//!
//! Every outbound generation goes through [`ResilientGenerationClient`], which
//! retries rate-limited calls on an exponential schedule and fails fast on
//! everything else:
//!
//! ```rust,ignore
//! use lakshya_rate_limit::ResilientGenerationClient;
//!
//! let client = ResilientGenerationClient::new(backend);
//! let response = client.generate(&request).await?;
//! ```
//!
//! [`LakshyaConfig`] loads the retry policy, model settings and prompt
//! templates from bundled defaults plus user overrides.

mod backoff;
mod client;
mod config;

pub use backoff::BackoffSchedule;
pub use client::{GenerationReport, ResilientGenerationClient};
pub use config::{ChatConfig, LakshyaConfig, ModelConfig, StorageConfig, TemplateConfig};
pub use tokio_util::sync::CancellationToken;
