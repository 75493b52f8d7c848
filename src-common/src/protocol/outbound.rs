//! Client-to-analyzer messages.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::ProtocolError;

/// Message sent from the engine to the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// One capture block of mono f32 PCM, base64 encoded
    AudioChunk { audio_data: String },
    /// Playback position heartbeat in seconds
    SongPosition { position: f64 },
    /// The performer stopped singing
    EndPerformance,
}

impl ClientMessage {
    /// Build an audio chunk from raw capture samples.
    pub fn audio_chunk(samples: &[f32]) -> Self {
        ClientMessage::AudioChunk {
            audio_data: encode_pcm(samples),
        }
    }

    /// Whether the outbound queue may drop this message under pressure.
    pub fn is_audio(&self) -> bool {
        matches!(self, ClientMessage::AudioChunk { .. })
    }

    /// Serialize to a JSON text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a JSON text frame (used by analyzer-side code and tests).
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::MalformedMessage(e.to_string()))
    }
}

/// Encode f32 samples as little-endian bytes in base64.
pub fn encode_pcm(samples: &[f32]) -> String {
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    BASE64_STANDARD.encode(bytes)
}

/// Decode a base64 little-endian f32 payload.
pub fn decode_pcm(data: &str) -> Result<Vec<f32>, ProtocolError> {
    let bytes = BASE64_STANDARD
        .decode(data)
        .map_err(|e| ProtocolError::InvalidAudio(e.to_string()))?;

    if bytes.len() % 4 != 0 {
        return Err(ProtocolError::InvalidAudio(format!(
            "{} bytes is not a whole number of f32 samples",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
