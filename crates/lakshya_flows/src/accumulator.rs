//! Turning a fragment stream into a running transcript.

use futures_util::StreamExt;
use lakshya_error::{GenerationError, GenerationErrorKind, GenerationResult};
use lakshya_interface::FragmentStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Accumulates streamed fragments into a growing buffer.
///
/// Every fragment produces one snapshot of the whole buffer so far, in
/// arrival order; snapshots are never coalesced. The buffer survives a
/// failed or cancelled stream, so the caller can still show what arrived.
///
/// # Examples
///
/// ```
/// use lakshya_flows::StreamAccumulator;
///
/// let mut accumulator = StreamAccumulator::new();
/// assert_eq!(accumulator.push("Hello"), "Hello");
/// assert_eq!(accumulator.push(" world"), "Hello world");
/// assert_eq!(accumulator.fragments(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StreamAccumulator {
    buffer: String,
    fragments: usize,
}

impl StreamAccumulator {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment and return the snapshot it produces.
    pub fn push(&mut self, fragment: &str) -> &str {
        self.buffer.push_str(fragment);
        self.fragments += 1;
        &self.buffer
    }

    /// Text accumulated so far.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Number of fragments received.
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    /// Drain `stream`, calling `on_snapshot` once per fragment.
    ///
    /// Returns the final text when the stream ends.
    ///
    /// # Errors
    ///
    /// - `StreamInterrupted` carrying the partial buffer when the stream
    ///   yields an error
    /// - `Cancelled` when `cancel` fires first; the partial buffer stays
    ///   readable through [`buffer`](Self::buffer)
    #[instrument(skip_all)]
    pub async fn consume<F>(
        &mut self,
        mut stream: FragmentStream,
        cancel: &CancellationToken,
        mut on_snapshot: F,
    ) -> GenerationResult<String>
    where
        F: FnMut(&str) + Send,
    {
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(fragments = self.fragments, "Stream cancelled by caller");
                    return Err(GenerationError::new(GenerationErrorKind::Cancelled));
                }
                next = stream.next() => next,
            };

            match next {
                Some(Ok(fragment)) => on_snapshot(self.push(&fragment)),
                Some(Err(e)) => {
                    warn!(
                        fragments = self.fragments,
                        partial_len = self.buffer.len(),
                        error = %e.kind,
                        "Stream interrupted"
                    );
                    return Err(GenerationError::new(GenerationErrorKind::StreamInterrupted {
                        partial: self.buffer.clone(),
                        cause: e.kind.to_string(),
                    }));
                }
                None => {
                    debug!(fragments = self.fragments, length = self.buffer.len(), "Stream complete");
                    return Ok(self.buffer.clone());
                }
            }
        }
    }
}

/// Channels fed by [`spawn_accumulator`].
#[derive(Debug)]
pub struct AccumulatorHandle {
    /// One cumulative snapshot per fragment
    pub snapshots: mpsc::UnboundedReceiver<String>,
    /// The raw fragments, for forwarding to a transport
    pub fragments: mpsc::UnboundedReceiver<String>,
    /// Resolves to the same result as [`StreamAccumulator::consume`]
    pub result: JoinHandle<GenerationResult<String>>,
}

/// Consume `stream` on a spawned task, publishing snapshots and raw
/// fragments over channels.
///
/// Both receivers close when the stream ends. Dropping either receiver does
/// not stop accumulation.
pub fn spawn_accumulator(stream: FragmentStream, cancel: CancellationToken) -> AccumulatorHandle {
    let (snapshot_tx, snapshots) = mpsc::unbounded_channel();
    let (fragment_tx, fragments) = mpsc::unbounded_channel();
    let result = tokio::spawn(async move {
        let mut accumulator = StreamAccumulator::new();
        let mut forwarded = 0;
        accumulator
            .consume(stream, &cancel, |snapshot| {
                // Receivers may be gone; keep accumulating
                let _ = fragment_tx.send(snapshot[forwarded..].to_string());
                let _ = snapshot_tx.send(snapshot.to_string());
                forwarded = snapshot.len();
            })
            .await
    });
    AccumulatorHandle {
        snapshots,
        fragments,
        result,
    }
}
