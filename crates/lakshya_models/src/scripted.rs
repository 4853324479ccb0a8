//! Deterministic backend that replays a script of replies.

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use lakshya_core::{GenerationRequest, GenerationResponse};
use lakshya_error::{GenerationError, GenerationErrorKind, GenerationResult, RATE_LIMIT_STATUS};
use lakshya_interface::{FragmentStream, ModelBackend};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// One scripted reply, consumed by one backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedReply {
    /// Succeed with a single text output
    Text(String),
    /// Succeed with a full response
    Response(GenerationResponse),
    /// Fail the call itself (before any fragment for streams)
    Fail(GenerationErrorKind),
    /// Stream these steps; `generate` joins the fragments
    Stream(Vec<StreamStep>),
}

impl ScriptedReply {
    /// A text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// An HTTP 429 rejection.
    pub fn rate_limited() -> Self {
        Self::Fail(GenerationErrorKind::from_status(
            RATE_LIMIT_STATUS,
            "Resource has been exhausted (e.g. check quota).",
        ))
    }

    /// A non-retryable HTTP failure.
    pub fn http_error(status: u16, message: impl Into<String>) -> Self {
        Self::Fail(GenerationErrorKind::from_status(status, message))
    }

    /// A stream emitting `fragments` in order, then ending.
    pub fn fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Stream(
            fragments
                .into_iter()
                .map(|f| StreamStep::Fragment(f.into()))
                .collect(),
        )
    }
}

/// One step of a scripted stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamStep {
    /// Emit a text fragment
    Fragment(String),
    /// Wait before the next step
    Pause(Duration),
    /// Yield an error from inside the stream
    Fail(GenerationErrorKind),
}

/// A call observed by [`ScriptedBackend`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// When the call arrived, on tokio's clock
    pub at: Instant,
    /// Whether the call opened a stream
    pub streaming: bool,
    /// The request as received
    pub request: GenerationRequest,
}

/// Backend replaying a fixed script, recording every call.
///
/// Replies are consumed front to back. When the script runs out the
/// `repeat` reply is used if set, otherwise the call fails with a backend
/// error. Call instants come from `tokio::time`, so tests running on a
/// paused clock observe exact backoff delays.
///
/// # Examples
///
/// ```
/// use lakshya_models::{ScriptedBackend, ScriptedReply};
///
/// let backend = ScriptedBackend::new([
///     ScriptedReply::rate_limited(),
///     ScriptedReply::text("Hello!"),
/// ]);
/// assert_eq!(backend.call_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<ScriptedReply>>,
    repeat: Option<ScriptedReply>,
    latency: Option<Duration>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    /// Backend answering with `replies` in order.
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Backend answering every call with `reply`.
    pub fn always(reply: ScriptedReply) -> Self {
        Self {
            repeat: Some(reply),
            ..Self::default()
        }
    }

    /// Reply used once the script is exhausted.
    pub fn then_always(mut self, reply: ScriptedReply) -> Self {
        self.repeat = Some(reply);
        self
    }

    /// Simulated network latency added to every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Arrival instant of every call.
    pub fn call_instants(&self) -> Vec<Instant> {
        lock(&self.calls).iter().map(|call| call.at).collect()
    }

    /// Every call received, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Gaps between consecutive calls.
    pub fn call_gaps(&self) -> Vec<Duration> {
        let instants = self.call_instants();
        instants
            .windows(2)
            .map(|pair| pair[1].duration_since(pair[0]))
            .collect()
    }

    async fn next_reply(
        &self,
        request: &GenerationRequest,
        streaming: bool,
    ) -> GenerationResult<ScriptedReply> {
        lock(&self.calls).push(RecordedCall {
            at: Instant::now(),
            streaming,
            request: request.clone(),
        });

        let reply = lock(&self.script)
            .pop_front()
            .or_else(|| self.repeat.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        reply.ok_or_else(|| GenerationError::backend("scripted backend has no replies left"))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    #[instrument(skip_all)]
    async fn generate(&self, req: &GenerationRequest) -> GenerationResult<GenerationResponse> {
        let reply = self.next_reply(req, false).await?;
        debug!(?reply, "Replaying scripted reply");

        match reply {
            ScriptedReply::Text(text) => Ok(GenerationResponse::from_text(text)),
            ScriptedReply::Response(response) => Ok(response),
            ScriptedReply::Fail(kind) => Err(GenerationError::new(kind)),
            ScriptedReply::Stream(steps) => {
                let mut text = String::new();
                for step in steps {
                    match step {
                        StreamStep::Fragment(fragment) => text.push_str(&fragment),
                        StreamStep::Pause(duration) => tokio::time::sleep(duration).await,
                        StreamStep::Fail(kind) => return Err(GenerationError::new(kind)),
                    }
                }
                Ok(GenerationResponse::from_text(text))
            }
        }
    }

    #[instrument(skip_all)]
    async fn generate_stream(&self, req: &GenerationRequest) -> GenerationResult<FragmentStream> {
        let reply = self.next_reply(req, true).await?;
        debug!(?reply, "Replaying scripted stream");

        let steps = match reply {
            ScriptedReply::Text(text) => vec![StreamStep::Fragment(text)],
            ScriptedReply::Response(response) => vec![StreamStep::Fragment(response.text())],
            ScriptedReply::Fail(kind) => return Err(GenerationError::new(kind)),
            ScriptedReply::Stream(steps) => steps,
        };

        let stream = stream::iter(steps).filter_map(|step| async move {
            match step {
                StreamStep::Fragment(fragment) => Some(Ok(fragment)),
                StreamStep::Fail(kind) => Some(Err(GenerationError::new(kind))),
                StreamStep::Pause(duration) => {
                    tokio::time::sleep(duration).await;
                    None
                }
            }
        });

        Ok(Box::pin(stream))
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}
