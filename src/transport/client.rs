use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use super::backend::{Backend, ByteStream, ChatRequest};
use crate::error::{ChatError, Result};

/// Budget for a whole request, from send to the last byte.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Longest budget accepted from configuration.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

// Deadline used when `now + timeout` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Opens one abortable request per turn.
///
/// Every suspension point (response headers, each read) races the backend
/// against the abort signal and a fixed deadline.
#[derive(Clone)]
pub struct TransportClient {
    backend: Arc<dyn Backend>,
    timeout: Duration,
}

impl TransportClient {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends `request` to `endpoint` and waits for the response headers.
    ///
    /// The deadline starts now and carries over into the returned stream.
    pub async fn open(
        &self,
        endpoint: &str,
        request: &ChatRequest,
        abort: CancellationToken,
    ) -> Result<ResponseStream> {
        let now = Instant::now();
        let deadline = now
            .checked_add(self.timeout)
            .unwrap_or_else(|| now + FAR_FUTURE);

        let body = tokio::select! {
            biased;
            () = abort.cancelled() => Err(ChatError::Cancelled),
            () = sleep_until(deadline) => {
                abort.cancel();
                Err(ChatError::Timeout(self.timeout))
            }
            result = self.backend.post(endpoint, request) => result,
        }?;

        Ok(ResponseStream {
            body,
            deadline,
            timeout: self.timeout,
            abort,
        })
    }
}

/// Body of an open request, bounded by the deadline set in
/// [`TransportClient::open`].
///
/// Dropping the stream closes the connection; no timer outlives it.
pub struct ResponseStream {
    body: ByteStream,
    deadline: Instant,
    timeout: Duration,
    abort: CancellationToken,
}

impl ResponseStream {
    /// Reads the next chunk. `Ok(None)` means the backend closed the stream.
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        tokio::select! {
            biased;
            () = self.abort.cancelled() => Err(ChatError::Cancelled),
            () = sleep_until(self.deadline) => {
                self.abort.cancel();
                Err(ChatError::Timeout(self.timeout))
            }
            item = self.body.next() => item.transpose(),
        }
    }

    /// The remaining chunks as a stream. The first error ends it.
    pub fn into_chunks(self) -> impl Stream<Item = Result<Bytes>> + Send {
        futures_util::stream::try_unfold(self, |mut body| async move {
            Ok(body.next_chunk().await?.map(|chunk| (chunk, body)))
        })
    }
}
