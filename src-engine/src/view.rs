//! Fixed-cadence view of both timelines around the playback position.

use pitchcoach_common::WindowPoint;
use serde::Deserialize;

use crate::timeline::{PitchTimelineStore, TimelineKind};

/// Window geometry in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Seconds shown before the playback position
    pub lookback: f64,
    /// Seconds shown after the playback position
    pub lookahead: f64,
    /// Spacing between points
    pub step: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            lookback: 2.0,
            lookahead: 3.0,
            step: 0.05,
        }
    }
}

/// Slack for floating point error when counting steps.
const STEP_EPSILON: f64 = 1e-9;

/// Build the visible window with the default geometry.
pub fn build_window(store: &PitchTimelineStore, current_time: f64) -> Vec<WindowPoint> {
    build_window_with(store, current_time, &ViewConfig::default())
}

/// Build the visible window.
///
/// Each point carries the nearest reference and user pitch within half a
/// step of its time, or `None`. Values are never interpolated or carried
/// forward from earlier points.
pub fn build_window_with(
    store: &PitchTimelineStore,
    current_time: f64,
    view: &ViewConfig,
) -> Vec<WindowPoint> {
    if view.step.is_nan() || view.step <= 0.0 || !current_time.is_finite() {
        return Vec::new();
    }

    let start = (current_time - view.lookback).max(0.0);
    let mut end = current_time + view.lookahead;
    if let Some(duration) = store.duration() {
        end = end.min(duration);
    }
    if end < start {
        return Vec::new();
    }

    let count = ((end - start) / view.step + STEP_EPSILON).floor() as usize + 1;
    let tolerance = view.step / 2.0;

    (0..count)
        .map(|i| {
            let time = (start + i as f64 * view.step).min(end);
            WindowPoint {
                time,
                reference: store
                    .nearest(TimelineKind::Reference, time, tolerance)
                    .and_then(|s| s.pitch),
                user: store
                    .nearest(TimelineKind::User, time, tolerance)
                    .and_then(|s| s.pitch),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pitchcoach_common::PitchSample;

    #[test]
    fn test_empty_store_window_length() {
        let store = PitchTimelineStore::new();
        let window = build_window(&store, 5.0);

        assert_eq!(window.len(), 101);
        assert!(window
            .iter()
            .all(|p| p.reference.is_none() && p.user.is_none()));
        assert_relative_eq!(window[0].time, 3.0);
        assert_relative_eq!(window[window.len() - 1].time, 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_window_clamped_to_track() {
        let mut store = PitchTimelineStore::new();
        store
            .load_reference(vec![PitchSample::new(0.0, Some(220.0)), PitchSample::new(4.0, Some(220.0))])
            .unwrap();

        let window = build_window(&store, 0.5);
        assert_relative_eq!(window[0].time, 0.0);
        assert_relative_eq!(window[window.len() - 1].time, 3.5, epsilon = 1e-9);

        let tail = build_window(&store, 3.0);
        assert_relative_eq!(tail[tail.len() - 1].time, 4.0, epsilon = 1e-9);
        assert!(tail.iter().all(|p| p.time >= 1.0 - 1e-9 && p.time <= 5.0 + 1e-9));
    }

    #[test]
    fn test_last_point_never_past_track_end() {
        let mut store = PitchTimelineStore::new();
        store
            .load_reference(vec![PitchSample::new(0.0, Some(220.0)), PitchSample::new(0.3, Some(220.0))])
            .unwrap();
        let view = ViewConfig {
            lookback: 0.0,
            lookahead: 1.0,
            step: 0.1,
        };

        // 3 * 0.1 lands a hair past 0.3
        let window = build_window_with(&store, 0.0, &view);
        assert_eq!(window.len(), 4);
        assert!(window.iter().all(|p| p.time <= 0.3));
        assert_eq!(window[3].time, 0.3);
        assert_eq!(window[3].reference, Some(220.0));

        let clamped = build_window(&store, 0.25);
        assert!(clamped.iter().all(|p| p.time <= 0.3));
    }

    #[test]
    fn test_points_match_within_half_step() {
        let mut store = PitchTimelineStore::new();
        store
            .load_reference((0..200).map(|i| PitchSample::new(i as f64 * 0.01, Some(440.0))).collect())
            .unwrap();
        store.append_user(vec![
            PitchSample::new(1.01, Some(430.0)),
            PitchSample::new(1.10, None),
        ]);

        let window = build_window(&store, 1.0);
        let at = |t: f64| {
            window
                .iter()
                .find(|p| (p.time - t).abs() < 1e-6)
                .copied()
                .unwrap()
        };

        assert_eq!(at(1.0).user, Some(430.0));
        assert_eq!(at(1.0).reference, Some(440.0));
        // No carry-forward to the next point
        assert_eq!(at(1.05).user, None);
        // Matched sample with no pitch stays empty
        assert_eq!(at(1.1).user, None);
        assert_eq!(at(1.1).reference, Some(440.0));
    }

    #[test]
    fn test_degenerate_step() {
        let store = PitchTimelineStore::new();
        let view = ViewConfig {
            step: 0.0,
            ..ViewConfig::default()
        };
        assert!(build_window_with(&store, 1.0, &view).is_empty());
    }
}
