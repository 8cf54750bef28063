//! The streaming chat session engine.
//!
//! [`ChatSession`] is the only type a front end needs: it routes input,
//! drives the transport, decodes the stream, reports progress to observers
//! and keeps the transcript.

mod engine;
mod message;
mod observer;
mod router;

pub use engine::{ChatSession, Turn, TurnOutcome, TurnState};
pub use message::{Message, Role};
pub use observer::{SessionEvent, SessionObserver};
pub use router::{CommandRouter, Route};
