//! Incremental decoder for `data: ` event streams.
//!
//! The backend writes one fragment per `data: ` line and signals the end of a
//! response by closing the connection. Chunk boundaries from the transport
//! never line up with line boundaries, so the decoder carries the unfinished
//! tail of the previous chunk into the next call.

use bytes::Bytes;
use futures_util::Stream;

use crate::error::{ChatError, Result};

/// Prefix marking an event line.
pub const EVENT_PREFIX: &str = "data: ";

/// Stateful line decoder. One instance per turn.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    // Raw bytes so a multi-byte character split across chunks survives.
    pending: Vec<u8>,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns the fragments completed by it, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let tail = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, tail);

        complete
            .split(|&b| b == b'\n')
            .filter_map(decode_line)
            .collect()
    }

    /// Emits the pending line if it is a complete event line; otherwise
    /// discards it. The decoder is empty afterwards.
    pub fn flush(&mut self) -> Option<String> {
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return None;
        }
        decode_line(&pending)
    }

    /// Returns `true` if a partial line is buffered.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Extracts the fragment from one complete line.
///
/// Returns `None` for non-event lines, blank payloads and lines that are not
/// valid UTF-8.
fn decode_line(line: &[u8]) -> Option<String> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);

    let text = match std::str::from_utf8(line) {
        Ok(text) => text,
        Err(e) => {
            let err = ChatError::Decode(format!("{e} in {} bytes", line.len()));
            tracing::warn!(error = %err, "skipping event line");
            return None;
        }
    };

    let payload = text.strip_prefix(EVENT_PREFIX)?;
    if payload.trim().is_empty() {
        return None;
    }
    Some(payload.to_string())
}

/// Converts a raw byte stream into a stream of fragments.
///
/// The first transport error is passed through and ends the stream without
/// a flush; otherwise the decoder is flushed when the byte stream ends.
pub fn decode_stream<S>(byte_stream: S) -> impl Stream<Item = Result<String>> + Send
where
    S: Stream<Item = Result<Bytes>> + Send,
{
    async_stream::stream! {
        use futures_util::StreamExt;

        let mut byte_stream = std::pin::pin!(byte_stream);
        let mut decoder = StreamDecoder::new();

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = match chunk_result {
                Ok(c) => c,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            for fragment in decoder.feed(&chunk) {
                yield Ok(fragment);
            }
        }

        if let Some(fragment) = decoder.flush() {
            yield Ok(fragment);
        }
    }
}
