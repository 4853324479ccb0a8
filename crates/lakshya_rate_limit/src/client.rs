//! Retrying wrapper around a model backend.

use crate::BackoffSchedule;
use chrono::Utc;
use lakshya_core::{AttemptOutcome, GenerationAttempt, GenerationRequest, GenerationResponse, RetryPolicy};
use lakshya_error::{GenerationError, GenerationErrorKind, GenerationResult, RetryableError};
use lakshya_interface::{FragmentStream, ModelBackend};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_retry2::{Retry, RetryError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Result of a generation together with every attempt it took.
#[derive(Debug)]
pub struct GenerationReport<T> {
    /// Final outcome
    pub result: GenerationResult<T>,
    /// Attempts in order; the last one decided the outcome
    pub attempts: Vec<GenerationAttempt>,
}

/// Issues generation requests with bounded retry on rate limiting.
///
/// Rate limiting is the only retryable condition. Each retry waits
/// `base_delay_ms × backoff_multiplier^attempt` without blocking other tasks;
/// any other failure propagates immediately. When every attempt is rate
/// limited the call fails with
/// [`GenerationErrorKind::RetriesExhausted`].
///
/// The client holds no mutable state, so one instance can serve concurrent
/// sessions, each passing its own policy.
///
/// # Example
///
/// ```rust,ignore
/// use lakshya_core::{GenerationRequest, RetryPolicy};
/// use lakshya_rate_limit::{CancellationToken, ResilientGenerationClient};
///
/// let client = ResilientGenerationClient::new(backend);
/// let policy = RetryPolicy::builder().max_attempts(5).build()?;
/// let response = client
///     .execute(&GenerationRequest::from_text("Hi"), &policy, &CancellationToken::new())
///     .await?;
/// ```
#[derive(Clone)]
pub struct ResilientGenerationClient {
    backend: Arc<dyn ModelBackend>,
    default_policy: RetryPolicy,
}

impl std::fmt::Debug for ResilientGenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientGenerationClient")
            .field("provider", &self.backend.provider_name())
            .field("model", &self.backend.model_name())
            .field("default_policy", &self.default_policy)
            .finish()
    }
}

impl ResilientGenerationClient {
    /// Wrap `backend` using the default retry policy.
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            backend,
            default_policy: RetryPolicy::default(),
        }
    }

    /// Replace the policy used by [`generate`](Self::generate) and
    /// [`generate_stream`](Self::generate_stream).
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &Arc<dyn ModelBackend> {
        &self.backend
    }

    /// Policy applied when the caller does not pass one.
    pub fn default_policy(&self) -> &RetryPolicy {
        &self.default_policy
    }

    /// Generate a complete response with the default policy.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult<GenerationResponse> {
        self.execute(request, &self.default_policy, &CancellationToken::new())
            .await
    }

    /// Open a fragment stream with the default policy.
    pub async fn generate_stream(&self, request: &GenerationRequest) -> GenerationResult<FragmentStream> {
        self.execute_stream(request, &self.default_policy, &CancellationToken::new())
            .await
    }

    /// Generate a complete response, retrying rate-limited attempts.
    ///
    /// # Errors
    ///
    /// - `RetriesExhausted` when every attempt allowed by `policy` was rate limited
    /// - `Cancelled` when `cancel` fires before a payload arrives
    /// - the backend's own error for anything that is not rate limiting
    #[instrument(skip_all, fields(provider = self.backend.provider_name(), model = self.backend.model_name()))]
    pub async fn execute(
        &self,
        request: &GenerationRequest,
        policy: &RetryPolicy,
        cancel: &CancellationToken,
    ) -> GenerationResult<GenerationResponse> {
        self.execute_with_report(request, policy, cancel).await.result
    }

    /// Like [`execute`](Self::execute), also returning the attempt ledger.
    pub async fn execute_with_report(
        &self,
        request: &GenerationRequest,
        policy: &RetryPolicy,
        cancel: &CancellationToken,
    ) -> GenerationReport<GenerationResponse> {
        let backend = &self.backend;
        run_with_retry(policy, cancel, || backend.generate(request)).await
    }

    /// Open a fragment stream, retrying only the call that opens it.
    ///
    /// Once fragments flow, a failure is yielded by the stream and never
    /// retried.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute), for the opening call.
    #[instrument(skip_all, fields(provider = self.backend.provider_name(), model = self.backend.model_name()))]
    pub async fn execute_stream(
        &self,
        request: &GenerationRequest,
        policy: &RetryPolicy,
        cancel: &CancellationToken,
    ) -> GenerationResult<FragmentStream> {
        let backend = &self.backend;
        run_with_retry(policy, cancel, || backend.generate_stream(request))
            .await
            .result
    }
}

/// Drive `operation` under `policy` until it succeeds, fails permanently,
/// runs out of attempts, or `cancel` fires.
async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    operation: F,
) -> GenerationReport<T>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = GenerationResult<T>> + Send,
    T: Send,
{
    if let Err(reason) = policy.validate() {
        return GenerationReport {
            result: Err(GenerationError::new(GenerationErrorKind::InvalidRequest(
                format!("invalid retry policy: {}", reason),
            ))),
            attempts: Vec::new(),
        };
    }

    let max_attempts = *policy.max_attempts();
    let ledger: Mutex<Vec<GenerationAttempt>> = Mutex::new(Vec::new());
    let ledger_ref = &ledger;
    let operation = &operation;
    let mut next_index: u32 = 0;

    let action = move || {
        let index = next_index;
        next_index += 1;
        let started_at = Utc::now();
        let attempt = operation();
        async move {
            debug!(attempt = index + 1, max_attempts, "Calling model backend");
            let result = attempt.await;

            let outcome = match &result {
                Ok(_) => AttemptOutcome::Success,
                Err(e) if e.is_retryable() => AttemptOutcome::RateLimited(e.kind.to_string()),
                Err(e) => AttemptOutcome::OtherFailure(e.kind.to_string()),
            };
            ledger_ref.lock().await.push(GenerationAttempt {
                index,
                started_at,
                outcome,
            });

            match result {
                Ok(value) => Ok(value),
                Err(e) if e.is_retryable() => {
                    if index + 1 < max_attempts {
                        warn!(
                            attempt = index + 1,
                            delay_ms = policy.delay_for(index).as_millis() as u64,
                            "Rate limited, backing off before retry"
                        );
                    } else {
                        warn!(attempt = index + 1, "Rate limited on final attempt");
                    }
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => {
                    warn!(attempt = index + 1, error = %e, "Permanent error, failing immediately");
                    Err(RetryError::Permanent(e))
                }
            }
        }
    };

    let retry = Retry::spawn(BackoffSchedule::new(policy), action);

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("Generation cancelled by caller");
            Err(GenerationError::new(GenerationErrorKind::Cancelled))
        }
        result = retry => result,
    };

    let attempts = ledger.into_inner();
    let result = result.map_err(|e| match e.kind {
        GenerationErrorKind::RateLimited(last) => {
            GenerationError::new(GenerationErrorKind::RetriesExhausted {
                attempts: attempts.len() as u32,
                last,
            })
        }
        _ => e,
    });

    GenerationReport { result, attempts }
}
