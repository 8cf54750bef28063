//! HTTP transport and stream decoding.

mod backend;
mod client;
mod decoder;

pub use backend::{Backend, ByteStream, ChatRequest, HttpBackend};
pub use client::{DEFAULT_TIMEOUT, MAX_TIMEOUT, ResponseStream, TransportClient};
pub use decoder::{EVENT_PREFIX, StreamDecoder, decode_stream};
