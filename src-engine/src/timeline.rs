//! Time-indexed storage for reference and user pitch.
//!
//! The reference track is loaded once per session. User samples arrive in
//! batches from the analyzer, possibly out of timestamp order, and are kept
//! sorted on insert so window queries are a pair of binary searches.

use pitchcoach_common::PitchSample;
use tracing::debug;

use crate::error::TimelineError;

/// Which of the two timelines to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineKind {
    Reference,
    User,
}

/// Reference and user pitch timelines.
#[derive(Debug, Default)]
pub struct PitchTimelineStore {
    reference: Option<Vec<PitchSample>>,
    /// Sorted by timestamp; equal timestamps keep arrival order
    user: Vec<PitchSample>,
}

impl PitchTimelineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the reference track. Rejected if one is already loaded.
    pub fn load_reference(&mut self, mut samples: Vec<PitchSample>) -> Result<(), TimelineError> {
        if self.reference.is_some() {
            return Err(TimelineError::ReferenceAlreadyLoaded);
        }
        samples.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        debug!("Loaded reference timeline ({} samples)", samples.len());
        self.reference = Some(samples);
        Ok(())
    }

    /// Reference track length: the last reference sample's timestamp.
    pub fn duration(&self) -> Option<f64> {
        self.reference
            .as_ref()
            .and_then(|samples| samples.last())
            .map(|s| s.timestamp)
    }

    /// Merge a batch of user samples, in any order.
    pub fn append_user(&mut self, samples: impl IntoIterator<Item = PitchSample>) {
        for sample in samples {
            let in_order = self
                .user
                .last()
                .map_or(true, |last| last.timestamp <= sample.timestamp);
            if in_order {
                self.user.push(sample);
            } else {
                let idx = self
                    .user
                    .partition_point(|s| s.timestamp <= sample.timestamp);
                self.user.insert(idx, sample);
            }
        }
    }

    /// All samples of `kind` with `t_start <= timestamp <= t_end`, sorted.
    pub fn query_window(&self, kind: TimelineKind, t_start: f64, t_end: f64) -> &[PitchSample] {
        let samples = self.samples(kind);
        if t_end < t_start {
            return &[];
        }
        let lo = samples.partition_point(|s| s.timestamp < t_start);
        let hi = samples.partition_point(|s| s.timestamp <= t_end);
        &samples[lo..hi.max(lo)]
    }

    /// The sample of `kind` closest to `time`, if strictly within `tolerance`.
    pub fn nearest(&self, kind: TimelineKind, time: f64, tolerance: f64) -> Option<&PitchSample> {
        self.query_window(kind, time - tolerance, time + tolerance)
            .iter()
            .filter(|s| (s.timestamp - time).abs() < tolerance)
            .min_by(|a, b| {
                (a.timestamp - time)
                    .abs()
                    .total_cmp(&(b.timestamp - time).abs())
            })
    }

    pub fn len(&self, kind: TimelineKind) -> usize {
        self.samples(kind).len()
    }

    /// Clear the user timeline. The reference stays.
    pub fn reset(&mut self) {
        self.user.clear();
    }

    fn samples(&self, kind: TimelineKind) -> &[PitchSample] {
        match kind {
            TimelineKind::Reference => self.reference.as_deref().unwrap_or(&[]),
            TimelineKind::User => &self.user,
        }
    }
}
