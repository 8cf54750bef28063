//! Error taxonomy for the chat engine.
//!
//! Every variant except [`ChatError::Config`] is produced while a turn is in
//! flight and is converted into a transcript entry by the session; none of
//! them reach the caller of `submit`.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by the transport, decoder, router and session.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The request could not be sent (DNS, connection refused, TLS, ...).
    #[error("Failed to reach {url}: {message}")]
    Network { url: String, message: String },

    /// The backend answered with a non-success status.
    #[error("Backend returned HTTP {status}{}", format_body(.body))]
    HttpStatus { status: u16, body: String },

    /// The response body could not be read as a stream.
    #[error("Response body is not readable: {0}")]
    StreamUnreadable(String),

    /// The stream closed without a single fragment.
    #[error("No response received from the model")]
    EmptyResponse,

    /// The deadline elapsed before the stream completed.
    #[error("Request timed out after {}", format_duration(.0))]
    Timeout(Duration),

    /// The turn was aborted by an explicit cancel.
    #[error("Request was cancelled")]
    Cancelled,

    /// A complete event line was not valid UTF-8. Logged and dropped.
    #[error("Dropped malformed event line: {0}")]
    Decode(String),

    /// No endpoint is bound to the agent.
    #[error("No endpoint configured for agent '{0}'")]
    UnknownAgent(String),

    /// Invalid routing or roster configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ChatError {
    /// Returns `true` if the error came from the abort signal.
    pub const fn is_abort(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Cancelled)
    }
}

pub type Result<T, E = ChatError> = std::result::Result<T, E>;

fn format_body(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

/// Human-readable duration: "24 hours", "5 minutes", "90s", "250ms".
pub fn format_duration(duration: &Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 && secs % 3600 == 0 {
        let hours = secs / 3600;
        format!("{hours} hour{}", if hours == 1 { "" } else { "s" })
    } else if secs >= 60 && secs % 60 == 0 {
        let minutes = secs / 60;
        format!("{minutes} minute{}", if minutes == 1 { "" } else { "s" })
    } else if secs > 0 {
        format!("{secs}s")
    } else {
        format!("{}ms", duration.as_millis())
    }
}
