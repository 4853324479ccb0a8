//! Incremental decoder for `text/event-stream` bodies.

/// Splits a byte stream into SSE `data` payloads.
///
/// Network chunks may end anywhere, including inside a multi-byte
/// character, so bytes are buffered until a blank line closes the event.
///
/// # Examples
///
/// ```
/// use lakshya_models::SseDecoder;
///
/// let mut decoder = SseDecoder::default();
/// assert!(decoder.push(b"data: {\"a\"").is_empty());
/// assert_eq!(decoder.push(b":1}\n\n"), vec!["{\"a\":1}".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Feed a chunk, returning the payloads of every event it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some((end, separator)) = find_event_end(&self.buffer) {
            let raw: Vec<u8> = self.buffer.drain(..end + separator).collect();
            if let Some(data) = event_data(&raw[..end]) {
                events.push(data);
            }
        }
        events
    }

    /// Flush a trailing event the server did not terminate.
    pub fn finish(&mut self) -> Vec<String> {
        let raw = std::mem::take(&mut self.buffer);
        event_data(&raw).into_iter().collect()
    }
}

/// Position of the first blank line and the length of its separator.
fn find_event_end(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = buffer.windows(2).position(|w| w == b"\n\n").map(|i| (i, 2));
    let crlf = buffer
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|i| (i, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

/// Joined `data:` lines of one event, `None` for comment-only events.
fn event_data(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let lines: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.strip_prefix(' ').unwrap_or(data))
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}
