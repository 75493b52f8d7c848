//! Shared types for Pitch Coach timelines and analysis results.

use serde::{Deserialize, Serialize};

/// A timestamped fundamental-frequency estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchSample {
    /// Seconds from the start of the performance
    pub timestamp: f64,
    /// Detected pitch in Hz, `None` when no pitch was detected (silence)
    #[serde(default)]
    pub pitch: Option<f64>,
}

impl PitchSample {
    pub fn new(timestamp: f64, pitch: Option<f64>) -> Self {
        Self { timestamp, pitch }
    }

    /// Copy of this sample moved by `offset` seconds.
    pub fn shifted(self, offset: f64) -> Self {
        Self {
            timestamp: self.timestamp + offset,
            ..self
        }
    }
}

/// One comparison row as reported by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchComparison {
    pub timestamp: f64,
    #[serde(default)]
    pub reference_pitch: Option<f64>,
    #[serde(default)]
    pub user_pitch: Option<f64>,
    #[serde(default)]
    pub deviation_percentage: Option<f64>,
}

/// Whether the singer was sharp or flat relative to the reference.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitchDirection {
    /// User pitch above the reference
    Above,
    /// User pitch below the reference
    Below,
    /// No pitch pair available, or as many above as below
    #[default]
    Unknown,
}

/// A timestamped measure of how far the user diverged from the reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviationEvent {
    pub timestamp: f64,
    /// Absolute deviation in percent of the reference pitch, `None` when no
    /// comparison was possible at this instant
    pub deviation_percentage: Option<f64>,
    /// Sharp/flat tendency when both pitches were known
    pub direction: PitchDirection,
}

impl DeviationEvent {
    pub fn new(timestamp: f64, deviation_percentage: Option<f64>) -> Self {
        Self {
            timestamp,
            deviation_percentage,
            direction: PitchDirection::Unknown,
        }
    }

    pub fn with_direction(mut self, direction: PitchDirection) -> Self {
        self.direction = direction;
        self
    }
}

impl From<PitchComparison> for DeviationEvent {
    fn from(comparison: PitchComparison) -> Self {
        let direction = match (comparison.user_pitch, comparison.reference_pitch) {
            (Some(user), Some(reference)) if user > reference => PitchDirection::Above,
            (Some(user), Some(reference)) if user < reference => PitchDirection::Below,
            _ => PitchDirection::Unknown,
        };
        Self {
            timestamp: comparison.timestamp,
            deviation_percentage: comparison.deviation_percentage,
            direction,
        }
    }
}

/// A coalesced time range of sustained, significant pitch deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProblemSection {
    pub start_time: f64,
    pub end_time: f64,
    /// Recency-weighted running deviation in percent
    pub avg_deviation: f64,
    #[serde(default)]
    pub direction: PitchDirection,
}

impl ProblemSection {
    /// Length of the section in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// One point of the fixed-cadence view around the playback position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowPoint {
    pub time: f64,
    pub reference: Option<f64>,
    pub user: Option<f64>,
}

/// Lifecycle state of a performance session.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    /// No attempt running
    #[default]
    Idle,
    /// Opening the analyzer channel and the microphone
    Connecting,
    /// Capturing and streaming
    Performing,
    /// Capture stopped, waiting for the analyzer to finish
    Finishing,
    /// Analyzer confirmed the end of the performance
    Completed,
    /// The channel failed or closed mid-attempt
    Disconnected { reason: String },
    /// Torn down on request
    Aborted,
}

impl SessionStatus {
    /// Whether the attempt has ended (successfully or not).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Disconnected { .. } | SessionStatus::Aborted
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Connecting => "connecting",
            SessionStatus::Performing => "performing",
            SessionStatus::Finishing => "finishing",
            SessionStatus::Completed => "completed",
            SessionStatus::Disconnected { .. } => "disconnected",
            SessionStatus::Aborted => "aborted",
        }
    }
}

/// Summary of one performance attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub status: SessionStatus,
    /// Reference track length in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Number of user pitch samples received
    pub user_samples: usize,
    /// Audio chunks dropped by the outbound queue
    pub dropped_audio_chunks: u64,
    /// Surfaced problem sections
    pub analyzed_sections: Vec<ProblemSection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_pitch_is_not_zero() {
        let sample: PitchSample = serde_json::from_str(r#"{"timestamp": 1.5, "pitch": null}"#).unwrap();
        assert_eq!(sample.pitch, None);

        let missing: PitchSample = serde_json::from_str(r#"{"timestamp": 1.5}"#).unwrap();
        assert_eq!(missing.pitch, None);

        let low: PitchSample = serde_json::from_str(r#"{"timestamp": 1.5, "pitch": 0.0}"#).unwrap();
        assert_eq!(low.pitch, Some(0.0));
    }

    #[test]
    fn test_comparison_direction() {
        let sharp = PitchComparison {
            timestamp: 1.0,
            reference_pitch: Some(220.0),
            user_pitch: Some(300.0),
            deviation_percentage: Some(36.4),
        };
        assert_eq!(DeviationEvent::from(sharp).direction, PitchDirection::Above);

        let flat = PitchComparison {
            user_pitch: Some(150.0),
            ..sharp
        };
        assert_eq!(DeviationEvent::from(flat).direction, PitchDirection::Below);

        let silent = PitchComparison {
            user_pitch: None,
            deviation_percentage: None,
            ..sharp
        };
        let event = DeviationEvent::from(silent);
        assert_eq!(event.direction, PitchDirection::Unknown);
        assert_eq!(event.deviation_percentage, None);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&SessionStatus::Disconnected {
            reason: "reset".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"state":"disconnected","reason":"reset"}"#);
        assert!(SessionStatus::Aborted.is_terminal());
        assert!(!SessionStatus::Finishing.is_terminal());
    }
}
