//! Pitch Coach streaming engine.
//!
//! Captures microphone audio, streams it to a remote pitch analyzer over a
//! WebSocket, merges the analyzer's results into a user pitch timeline next
//! to the reference track, and folds deviations into problem sections.

pub mod capture;
pub mod clock;
pub mod config;
pub mod error;
pub mod recording;
pub mod reducer;
pub mod reference;
pub mod session;
pub mod timeline;
pub mod transport;
pub mod view;

pub use config::EngineConfig;
pub use error::{
    CaptureError, ConfigError, RecordingError, ReferenceError, SessionError, TimelineError,
    TransportError,
};
pub use reference::ReferenceSource;
pub use session::{PerformanceSession, SessionControl, SessionUpdate};
