//! Folds per-sample deviation events into problem sections.
//!
//! Events are consumed in arrival order with a single open-section cursor.
//! The running deviation is a pairwise average `(avg + dev) / 2`, which
//! weights recent events more heavily than a true mean would.

use pitchcoach_common::{DeviationEvent, PitchDirection, ProblemSection};
use serde::Deserialize;
use tracing::debug;

/// Thresholds for section detection.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReducerConfig {
    /// Deviation in percent an event must exceed to count
    pub threshold: f64,
    /// Largest gap in seconds that still extends the open section
    pub gap_tolerance: f64,
    /// Sections must last longer than this many seconds to be surfaced
    pub min_duration: f64,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            threshold: 30.0,
            gap_tolerance: 0.5,
            min_duration: 0.5,
        }
    }
}

/// A section still accepting events, with its sharp/flat tally.
#[derive(Debug, Clone, Copy)]
struct OpenSection {
    start_time: f64,
    end_time: f64,
    avg_deviation: f64,
    above: u32,
    below: u32,
}

impl OpenSection {
    fn start(event: &DeviationEvent, deviation: f64) -> Self {
        let mut section = Self {
            start_time: event.timestamp,
            end_time: event.timestamp,
            avg_deviation: deviation,
            above: 0,
            below: 0,
        };
        section.tally(event.direction);
        section
    }

    fn extend(&mut self, event: &DeviationEvent, deviation: f64) {
        if event.timestamp >= self.start_time {
            self.end_time = event.timestamp;
        } else {
            self.start_time = event.timestamp;
        }
        self.avg_deviation = (self.avg_deviation + deviation) / 2.0;
        self.tally(event.direction);
    }

    fn tally(&mut self, direction: PitchDirection) {
        match direction {
            PitchDirection::Above => self.above += 1,
            PitchDirection::Below => self.below += 1,
            PitchDirection::Unknown => {}
        }
    }

    fn is_beyond_gap(&self, timestamp: f64, gap_tolerance: f64) -> bool {
        timestamp - self.end_time > gap_tolerance || self.start_time - timestamp > gap_tolerance
    }

    fn to_section(self) -> ProblemSection {
        let direction = if self.above > self.below {
            PitchDirection::Above
        } else if self.below > self.above {
            PitchDirection::Below
        } else {
            PitchDirection::Unknown
        };
        ProblemSection {
            start_time: self.start_time,
            end_time: self.end_time,
            avg_deviation: self.avg_deviation,
            direction,
        }
    }
}

/// Running problem-section state for one performance attempt.
#[derive(Debug, Default)]
pub struct ProblemSectionReducer {
    config: ReducerConfig,
    /// Closed sections, unfiltered
    finalized: Vec<ProblemSection>,
    current: Option<OpenSection>,
}

impl ProblemSectionReducer {
    pub fn new(config: ReducerConfig) -> Self {
        Self {
            config,
            finalized: Vec::new(),
            current: None,
        }
    }

    /// Feed one event. Returns true if the reducer state changed.
    pub fn push(&mut self, event: DeviationEvent) -> bool {
        let deviation = match event.deviation_percentage {
            Some(d) if d > self.config.threshold => d,
            _ => return false,
        };

        match self.current.as_mut() {
            Some(open) if !open.is_beyond_gap(event.timestamp, self.config.gap_tolerance) => {
                open.extend(&event, deviation);
            }
            Some(open) => {
                let closed = open.to_section();
                debug!(
                    "Closing section {:.2}-{:.2}s (avg {:.1}%)",
                    closed.start_time, closed.end_time, closed.avg_deviation
                );
                self.finalized.push(closed);
                self.current = Some(OpenSection::start(&event, deviation));
            }
            None => {
                self.current = Some(OpenSection::start(&event, deviation));
            }
        }
        true
    }

    /// Feed events in arrival order. Returns true if any changed the state.
    pub fn extend(&mut self, events: impl IntoIterator<Item = DeviationEvent>) -> bool {
        events
            .into_iter()
            .fold(false, |changed, event| self.push(event) || changed)
    }

    /// Sections long enough to report, including the open one.
    pub fn sections(&self) -> Vec<ProblemSection> {
        self.finalized
            .iter()
            .copied()
            .chain(self.current.map(OpenSection::to_section))
            .filter(|s| s.duration() > self.config.min_duration)
            .collect()
    }

    /// Drop all sections, e.g. at the start of a new attempt.
    pub fn reset(&mut self) {
        self.finalized.clear();
        self.current = None;
    }
}
