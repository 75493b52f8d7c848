//! Error types for the streaming engine.

use std::path::PathBuf;

pub use pitchcoach_common::protocol::ProtocolError;

/// Microphone setup and stream failures.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The OS refused access to the input device
    #[error("microphone permission denied: {0}")]
    PermissionDenied(String),

    /// No usable input device, or the device went away
    #[error("input device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The device was opened but the stream could not run
    #[error("audio stream error: {0}")]
    Stream(String),
}

/// Failures of the analyzer channel.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The WebSocket handshake failed
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    /// The channel was closed locally or by the peer
    #[error("channel closed")]
    ChannelClosed,

    /// The channel failed while open
    #[error("channel error: {0}")]
    ChannelError(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Pitch timeline store misuse.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    /// The reference track is immutable once loaded
    #[error("reference timeline already loaded")]
    ReferenceAlreadyLoaded,
}

/// Failures loading the reference pitch track.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("failed to fetch reference pitch from {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid reference pitch data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("reference pitch track is empty")]
    Empty,
}

/// Failures writing a recorded take.
#[derive(Debug, thiserror::Error)]
pub enum RecordingError {
    #[error("failed to write WAV file {path}: {source}")]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("failed to create recordings directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures loading an explicit configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failures starting or running a performance session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Timeline(#[from] TimelineError),

    /// An attempt is already running
    #[error("performance already in progress")]
    AlreadyRunning,
}
