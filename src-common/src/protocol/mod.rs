//! Wire protocol between the engine and the remote pitch analyzer.
//!
//! Messages are JSON objects tagged by a `type` field and travel as text
//! frames over a persistent WebSocket.

mod inbound;
mod outbound;

pub use inbound::ServerMessage;
pub use outbound::{decode_pcm, encode_pcm, ClientMessage};

/// Protocol encoding and decoding errors.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Inbound message failed to parse or is missing required fields
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// Audio payload is not valid base64 f32 PCM
    #[error("invalid audio payload: {0}")]
    InvalidAudio(String),

    /// Outbound message could not be serialized
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}
