//! Shared types and wire protocol for Pitch Coach.
//!
//! Used by the engine to talk to the remote pitch analyzer and by front-ends
//! that render the resulting timelines and problem sections.

pub mod protocol;
pub mod types;

pub use types::{
    DeviationEvent, PitchComparison, PitchDirection, PitchSample, ProblemSection, SessionReport,
    SessionStatus, WindowPoint,
};
