//! Analyzer-to-client messages.

use serde::{Deserialize, Serialize};

use super::ProtocolError;
use crate::types::{PitchComparison, PitchSample};

/// Message received from the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Results for one analyzed batch of audio
    PitchUpdate {
        /// Session time at which the batch starts; `user_pitch` timestamps
        /// are relative to it
        time_offset: f64,
        user_pitch: Vec<PitchSample>,
        /// Comparisons with absolute session timestamps
        comparisons: Vec<PitchComparison>,
    },
    /// The analyzer finished processing the performance
    PerformanceComplete {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl ServerMessage {
    /// Parse a JSON text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let message: ServerMessage = serde_json::from_str(text)
            .map_err(|e| ProtocolError::MalformedMessage(e.to_string()))?;
        message.validate()?;
        Ok(message)
    }

    /// Serialize to a JSON text frame (used by analyzer-side code and tests).
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reject values JSON can carry but the timeline cannot use.
    fn validate(&self) -> Result<(), ProtocolError> {
        if let ServerMessage::PitchUpdate {
            time_offset,
            user_pitch,
            comparisons,
        } = self
        {
            if !time_offset.is_finite() {
                return Err(ProtocolError::MalformedMessage(
                    "time_offset is not finite".into(),
                ));
            }
            let timestamps = user_pitch
                .iter()
                .map(|s| s.timestamp)
                .chain(comparisons.iter().map(|c| c.timestamp));
            for timestamp in timestamps {
                if !timestamp.is_finite() {
                    return Err(ProtocolError::MalformedMessage(
                        "sample timestamp is not finite".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}
