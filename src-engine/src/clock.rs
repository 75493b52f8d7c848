//! Reference playback clock.

use std::time::{Duration, Instant};

use serde::Deserialize;

/// Frame and heartbeat cadence.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Playback frames per second (window rebuilds)
    pub frame_rate: f64,
    /// Seconds between `song_position` heartbeats
    pub heartbeat_interval: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30.0,
            heartbeat_interval: 1.0,
        }
    }
}

impl PlaybackConfig {
    pub fn frame_interval(&self) -> Duration {
        let rate = if self.frame_rate.is_finite() && self.frame_rate > 0.0 {
            self.frame_rate
        } else {
            PlaybackConfig::default().frame_rate
        };
        Duration::from_secs_f64(1.0 / rate)
    }
}

/// Playback position in seconds, advancing with wall-clock time from
/// `start` and clamped to `[0, duration]`.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    duration: Option<f64>,
    started_at: Option<Instant>,
    current_time: f64,
    last_heartbeat: Option<f64>,
}

impl PlaybackClock {
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            duration,
            started_at: None,
            current_time: 0.0,
            last_heartbeat: None,
        }
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn start(&mut self, now: Instant) {
        self.reset();
        self.started_at = Some(now);
    }

    /// Stop advancing, keeping the current position.
    pub fn pause(&mut self) {
        self.started_at = None;
    }

    pub fn reset(&mut self) {
        self.started_at = None;
        self.current_time = 0.0;
        self.last_heartbeat = None;
    }

    /// Advance to `now`. Never moves backwards.
    pub fn tick(&mut self, now: Instant) -> f64 {
        if let Some(started_at) = self.started_at {
            let mut position = now.saturating_duration_since(started_at).as_secs_f64();
            if let Some(duration) = self.duration {
                position = position.min(duration);
            }
            self.current_time = self.current_time.max(position);
        }
        self.current_time
    }

    /// Whether playback reached the end of the reference track.
    pub fn is_finished(&self) -> bool {
        self.duration
            .is_some_and(|duration| self.current_time >= duration)
    }

    /// Returns the position to report if a heartbeat is due.
    pub fn heartbeat_due(&mut self, interval: f64) -> Option<f64> {
        let due = match self.last_heartbeat {
            None => true,
            Some(last) => self.current_time - last >= interval,
        };
        if due {
            self.last_heartbeat = Some(self.current_time);
            Some(self.current_time)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clock_advances_and_clamps() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::new(Some(3.0));
        assert_eq!(clock.tick(t0 + Duration::from_secs(1)), 0.0);

        clock.start(t0);
        assert_relative_eq!(clock.tick(t0 + Duration::from_millis(1500)), 1.5);
        assert!(!clock.is_finished());
        assert_relative_eq!(clock.tick(t0 + Duration::from_secs(10)), 3.0);
        assert!(clock.is_finished());
    }

    #[test]
    fn test_clock_is_monotonic() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::new(None);
        clock.start(t0);
        clock.tick(t0 + Duration::from_secs(2));
        assert_relative_eq!(clock.tick(t0 + Duration::from_secs(1)), 2.0);
    }

    #[test]
    fn test_reset_returns_to_zero() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::new(Some(10.0));
        clock.start(t0);
        clock.tick(t0 + Duration::from_secs(4));
        clock.reset();
        assert_eq!(clock.current_time(), 0.0);
        assert!(!clock.is_running());
    }

    #[test]
    fn test_heartbeat_cadence() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::new(None);
        clock.start(t0);
        assert_eq!(clock.heartbeat_due(1.0), Some(0.0));
        clock.tick(t0 + Duration::from_millis(500));
        assert_eq!(clock.heartbeat_due(1.0), None);
        clock.tick(t0 + Duration::from_millis(1000));
        assert_relative_eq!(clock.heartbeat_due(1.0).unwrap(), 1.0);
    }
}
