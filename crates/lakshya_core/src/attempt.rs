//! Records of individual generation attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a single attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The backend returned a payload (or opened a stream)
    #[display("success")]
    Success,
    /// The backend signalled rate limiting
    #[display("rate limited: {}", _0)]
    RateLimited(String),
    /// Any other failure; never retried
    #[display("failed: {}", _0)]
    OtherFailure(String),
}

/// One try at satisfying a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationAttempt {
    /// Attempt ordinal, starting at 0
    pub index: u32,
    /// When the attempt started
    pub started_at: DateTime<Utc>,
    /// How the attempt ended
    pub outcome: AttemptOutcome,
}

impl GenerationAttempt {
    /// Whether the attempt produced a payload.
    pub fn succeeded(&self) -> bool {
        self.outcome == AttemptOutcome::Success
    }
}
