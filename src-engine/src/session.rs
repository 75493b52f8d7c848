//! One performer's session: reference track, attempts, and the event loop.
//!
//! All session state is owned by [`PerformanceSession`] and mutated only by
//! its event loop. Capture blocks, analyzer messages, channel state changes,
//! playback frames and stop requests all arrive as [`SessionEvent`]s on one
//! unbounded queue and are handled one at a time. Events produced for an
//! earlier attempt carry an older generation and are ignored.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use pitchcoach_common::protocol::{ClientMessage, ServerMessage};
use pitchcoach_common::{
    DeviationEvent, PitchSample, ProblemSection, SessionReport, SessionStatus, WindowPoint,
};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::capture::{AudioBlock, AudioSource, CaptureHandle};
use crate::clock::PlaybackClock;
use crate::config::EngineConfig;
use crate::error::SessionError;
use crate::recording::TakeRecorder;
use crate::reducer::ProblemSectionReducer;
use crate::timeline::{PitchTimelineStore, TimelineKind};
use crate::transport::{Channel, ChannelEvent};
use crate::view::build_window_with;

/// Capacity of the update broadcast; slower subscribers lag.
const UPDATE_CAPACITY: usize = 256;

/// Input to the session event loop.
#[derive(Debug)]
pub(crate) enum SessionEvent {
    AudioBlock { generation: u64, block: AudioBlock },
    Inbound { generation: u64, message: ServerMessage },
    ChannelClosed { generation: u64 },
    ChannelFailed { generation: u64, reason: String },
    Frame { generation: u64 },
    StopRequested { generation: u64 },
    AbortRequested { generation: u64 },
}

/// Output of the session for whatever renders it.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    StatusChanged(SessionStatus),
    /// Playback position and the visible window around it
    Frame {
        position: f64,
        window: Vec<WindowPoint>,
    },
    /// The surfaced problem sections changed
    SectionsChanged(Vec<ProblemSection>),
    PerformanceComplete { message: Option<String> },
}

/// Cloneable handle for requesting a stop or abort from another task.
///
/// Requests target the attempt running when they are made; one still queued
/// when the next attempt starts is ignored.
#[derive(Debug, Clone)]
pub struct SessionControl {
    events: mpsc::UnboundedSender<SessionEvent>,
    generation: Arc<AtomicU64>,
}

impl SessionControl {
    /// Finish the attempt. A second request while finishing aborts.
    pub fn stop(&self) {
        let generation = self.generation.load(Ordering::SeqCst);
        let _ = self.events.send(SessionEvent::StopRequested { generation });
    }

    /// Tear the attempt down immediately.
    pub fn abort(&self) {
        let generation = self.generation.load(Ordering::SeqCst);
        let _ = self.events.send(SessionEvent::AbortRequested { generation });
    }
}

pub struct PerformanceSession {
    config: EngineConfig,
    source: Box<dyn AudioSource + Send>,
    store: PitchTimelineStore,
    reducer: ProblemSectionReducer,
    clock: PlaybackClock,
    status: SessionStatus,
    /// Incremented at the start of every attempt, shared with controls
    generation: Arc<AtomicU64>,
    channel: Option<Channel>,
    capture: Option<CaptureHandle>,
    ticker: Option<JoinHandle<()>>,
    recorder: Option<TakeRecorder>,
    /// Drop count of the last closed channel
    dropped_audio: u64,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    updates: broadcast::Sender<SessionUpdate>,
}

impl PerformanceSession {
    pub fn new(config: EngineConfig, source: Box<dyn AudioSource + Send>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        Self {
            reducer: ProblemSectionReducer::new(config.reducer),
            config,
            source,
            store: PitchTimelineStore::new(),
            clock: PlaybackClock::new(None),
            status: SessionStatus::Idle,
            generation: Arc::new(AtomicU64::new(0)),
            channel: None,
            capture: None,
            ticker: None,
            recorder: None,
            dropped_audio: 0,
            events_tx,
            events_rx,
            updates,
        }
    }

    /// Load the reference track. Only one load per session is accepted.
    pub fn load_reference(&mut self, samples: Vec<PitchSample>) -> Result<(), SessionError> {
        self.store.load_reference(samples)?;
        self.clock = PlaybackClock::new(self.store.duration());
        Ok(())
    }

    /// Keep the captured audio of each attempt for saving.
    pub fn enable_recording(&mut self) {
        self.recorder.get_or_insert_with(TakeRecorder::new);
    }

    pub fn recording(&self) -> Option<&TakeRecorder> {
        self.recorder.as_ref()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.updates.subscribe()
    }

    pub fn control(&self) -> SessionControl {
        SessionControl {
            events: self.events_tx.clone(),
            generation: self.generation.clone(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn store(&self) -> &PitchTimelineStore {
        &self.store
    }

    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    /// Surfaced problem sections of the current attempt.
    pub fn sections(&self) -> Vec<ProblemSection> {
        self.reducer.sections()
    }

    /// Visible window at the current playback position.
    pub fn window(&self) -> Vec<WindowPoint> {
        build_window_with(&self.store, self.clock.current_time(), &self.config.view)
    }

    fn is_running(&self) -> bool {
        matches!(
            self.status,
            SessionStatus::Connecting | SessionStatus::Performing | SessionStatus::Finishing
        )
    }

    /// Start a new attempt: clear user data, connect, and open the microphone.
    ///
    /// On failure nothing is left running.
    pub async fn start_performance(&mut self) -> Result<(), SessionError> {
        if self.is_running() {
            return Err(SessionError::AlreadyRunning);
        }

        self.end_attempt();
        let generation = self.next_generation();

        self.store.reset();
        self.reducer.reset();
        self.clock.reset();
        self.dropped_audio = 0;
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.clear();
        }
        self.publish(SessionUpdate::SectionsChanged(Vec::new()));
        self.set_status(SessionStatus::Connecting);

        let events = self.events_tx.clone();
        let opened = Channel::open(
            &self.config.server_url,
            &self.config.transport,
            move |event| {
                let event = match event {
                    ChannelEvent::Message(message) => SessionEvent::Inbound {
                        generation,
                        message,
                    },
                    ChannelEvent::Closed => SessionEvent::ChannelClosed { generation },
                    ChannelEvent::Failed(reason) => {
                        SessionEvent::ChannelFailed { generation, reason }
                    }
                };
                let _ = events.send(event);
            },
        )
        .await;
        let channel = match opened {
            Ok(channel) => channel,
            Err(e) => {
                error!("{}", e);
                self.set_status(SessionStatus::Disconnected {
                    reason: e.to_string(),
                });
                return Err(e.into());
            }
        };

        let events = self.events_tx.clone();
        let capture = match self.source.start(Box::new(move |block| {
            let _ = events.send(SessionEvent::AudioBlock { generation, block });
        })) {
            Ok(capture) => capture,
            Err(e) => {
                error!("Failed to start capture: {}", e);
                channel.close();
                self.set_status(SessionStatus::Idle);
                return Err(e.into());
            }
        };

        info!(
            "Performance started (attempt {}, {} Hz capture)",
            generation,
            capture.sample_rate()
        );
        self.channel = Some(channel);
        self.capture = Some(capture);
        self.clock.start(Instant::now());
        self.send_heartbeat();
        self.ticker = Some(self.spawn_frame_ticker(generation));
        self.set_status(SessionStatus::Performing);
        Ok(())
    }

    /// Drive the attempt until it ends, returning the final status.
    pub async fn run(&mut self) -> SessionStatus {
        while self.is_running() {
            match self.events_rx.recv().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }
        self.status.clone()
    }

    /// Summary of the current or last attempt.
    pub fn report(&self) -> SessionReport {
        SessionReport {
            status: self.status.clone(),
            duration: self.store.duration(),
            user_samples: self.store.len(TimelineKind::User),
            dropped_audio_chunks: self
                .channel
                .as_ref()
                .map_or(self.dropped_audio, Channel::dropped_audio),
            analyzed_sections: self.reducer.sections(),
        }
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn next_generation(&mut self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn handle_event(&mut self, event: SessionEvent) {
        let current = self.generation();
        match event {
            SessionEvent::AudioBlock { generation, block } if generation == current => {
                self.on_audio_block(block)
            }
            SessionEvent::Inbound {
                generation,
                message,
            } if generation == current => self.on_message(message),
            SessionEvent::ChannelClosed { generation } if generation == current => {
                self.on_channel_closed()
            }
            SessionEvent::ChannelFailed { generation, reason } if generation == current => {
                self.on_channel_failed(reason)
            }
            SessionEvent::Frame { generation } if generation == current => {
                self.on_frame(Instant::now())
            }
            SessionEvent::StopRequested { generation } if generation == current => {
                self.request_stop()
            }
            SessionEvent::AbortRequested { generation } if generation == current => self.abort(),
            _ => debug!("Ignoring event from a previous attempt"),
        }
    }

    fn on_audio_block(&mut self, block: AudioBlock) {
        if self.status != SessionStatus::Performing {
            return;
        }
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.push(&block.samples, block.sample_rate);
        }
        self.send(ClientMessage::audio_chunk(&block.samples));
    }

    fn on_message(&mut self, message: ServerMessage) {
        if !matches!(
            self.status,
            SessionStatus::Performing | SessionStatus::Finishing
        ) {
            return;
        }

        match message {
            ServerMessage::PitchUpdate {
                time_offset,
                user_pitch,
                comparisons,
            } => {
                debug!(
                    "Pitch update at {:.2}s: {} samples, {} comparisons",
                    time_offset,
                    user_pitch.len(),
                    comparisons.len()
                );
                self.store
                    .append_user(user_pitch.into_iter().map(|s| s.shifted(time_offset)));
                if self
                    .reducer
                    .extend(comparisons.into_iter().map(DeviationEvent::from))
                {
                    self.publish(SessionUpdate::SectionsChanged(self.reducer.sections()));
                }
            }
            ServerMessage::PerformanceComplete { message } => {
                info!(
                    "Analyzer completed the performance{}",
                    message
                        .as_deref()
                        .map(|m| format!(": {}", m))
                        .unwrap_or_default()
                );
                self.publish(SessionUpdate::PerformanceComplete { message });
                self.finish(SessionStatus::Completed);
            }
        }
    }

    fn on_channel_closed(&mut self) {
        match self.status {
            SessionStatus::Finishing => self.finish(SessionStatus::Completed),
            SessionStatus::Performing => {
                warn!("Analyzer closed the channel mid-performance");
                self.finish(SessionStatus::Disconnected {
                    reason: "analyzer closed the channel".to_string(),
                });
            }
            _ => {}
        }
    }

    fn on_channel_failed(&mut self, reason: String) {
        if self.is_running() {
            error!("Analyzer channel failed: {}", reason);
            self.finish(SessionStatus::Disconnected { reason });
        }
    }

    fn on_frame(&mut self, now: Instant) {
        if self.status != SessionStatus::Performing {
            return;
        }

        let position = self.clock.tick(now);
        self.send_heartbeat();
        let window = build_window_with(&self.store, position, &self.config.view);
        self.publish(SessionUpdate::Frame { position, window });

        if self.clock.is_finished() {
            info!("Reached the end of the reference track at {:.2}s", position);
            self.request_stop();
        }
    }

    /// Stop capturing and ask the analyzer to finish.
    fn request_stop(&mut self) {
        match self.status {
            SessionStatus::Performing => {
                info!("Finishing performance at {:.2}s", self.clock.current_time());
                if let Some(ticker) = self.ticker.take() {
                    ticker.abort();
                }
                if let Some(mut capture) = self.capture.take() {
                    capture.stop();
                }
                self.clock.pause();
                self.send(ClientMessage::EndPerformance);
                self.set_status(SessionStatus::Finishing);
            }
            SessionStatus::Finishing => {
                warn!("Stop requested while finishing, aborting");
                self.abort();
            }
            _ => {}
        }
    }

    fn abort(&mut self) {
        if self.is_running() {
            info!("Aborting performance");
            self.finish(SessionStatus::Aborted);
        }
    }

    fn finish(&mut self, status: SessionStatus) {
        self.end_attempt();
        self.set_status(status);
    }

    /// Release everything the current attempt holds. Idempotent.
    fn end_attempt(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        if let Some(mut capture) = self.capture.take() {
            capture.stop();
        }
        self.clock.pause();
        if let Some(channel) = self.channel.take() {
            self.dropped_audio = channel.dropped_audio();
            channel.close();
        }
    }

    fn send_heartbeat(&mut self) {
        if let Some(position) = self
            .clock
            .heartbeat_due(self.config.playback.heartbeat_interval)
        {
            self.send(ClientMessage::SongPosition { position });
        }
    }

    fn send(&self, message: ClientMessage) {
        let Some(channel) = self.channel.as_ref().filter(|c| c.is_open()) else {
            return;
        };
        if let Err(e) = channel.send(message) {
            debug!("Dropping outbound message: {}", e);
        }
    }

    fn spawn_frame_ticker(&self, generation: u64) -> JoinHandle<()> {
        let events = self.events_tx.clone();
        let period = self.config.playback.frame_interval();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if events.send(SessionEvent::Frame { generation }).is_err() {
                    break;
                }
            }
        })
    }

    fn set_status(&mut self, status: SessionStatus) {
        if self.status != status {
            debug!("Session status: {} -> {}", self.status.label(), status.label());
            self.status = status.clone();
            self.publish(SessionUpdate::StatusChanged(status));
        }
    }

    fn publish(&self, update: SessionUpdate) {
        // No subscribers is fine
        let _ = self.updates.send(update);
    }
}

impl Drop for PerformanceSession {
    fn drop(&mut self) {
        self.end_attempt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{BlockSink, CaptureHandle};
    use crate::error::CaptureError;
    use approx::assert_relative_eq;
    use pitchcoach_common::PitchComparison;
    use std::time::Duration;

    struct NullSource;

    impl AudioSource for NullSource {
        fn start(&self, _sink: BlockSink) -> Result<CaptureHandle, CaptureError> {
            Err(CaptureError::DeviceUnavailable("no device in tests".into()))
        }
    }

    fn session_with_reference(duration: f64) -> PerformanceSession {
        let mut session = PerformanceSession::new(EngineConfig::default(), Box::new(NullSource));
        let reference = (0..=(duration * 100.0) as usize)
            .map(|i| PitchSample::new(i as f64 * 0.01, Some(220.0)))
            .collect();
        session.load_reference(reference).unwrap();
        session
    }

    /// Put the session into a running attempt without a channel or device.
    fn begin(session: &mut PerformanceSession, now: Instant) {
        session.next_generation();
        session.clock.start(now);
        session.status = SessionStatus::Performing;
    }

    fn comparison(t: f64, dev: f64) -> PitchComparison {
        PitchComparison {
            timestamp: t,
            reference_pitch: Some(220.0),
            user_pitch: Some(220.0 * (1.0 + dev / 100.0)),
            deviation_percentage: Some(dev),
        }
    }

    fn pitch_update(offset: f64, user: Vec<PitchSample>, comparisons: Vec<PitchComparison>) -> SessionEvent {
        SessionEvent::Inbound {
            generation: 1,
            message: ServerMessage::PitchUpdate {
                time_offset: offset,
                user_pitch: user,
                comparisons,
            },
        }
    }

    #[test]
    fn test_second_reference_rejected() {
        let mut session = session_with_reference(1.0);
        let result = session.load_reference(vec![PitchSample::new(0.0, Some(110.0))]);
        assert!(matches!(result, Err(SessionError::Timeline(_))));
        assert_eq!(session.store().len(TimelineKind::Reference), 101);
    }

    #[test]
    fn test_pitch_update_applies_offset_and_reduces() {
        let mut session = session_with_reference(10.0);
        let mut updates = session.subscribe();
        begin(&mut session, Instant::now());

        session.handle_event(pitch_update(
            2.0,
            vec![PitchSample::new(0.1, Some(200.0)), PitchSample::new(0.0, None)],
            vec![comparison(2.0, 40.0), comparison(2.3, 50.0), comparison(2.6, 60.0)],
        ));

        let user = session.store().query_window(TimelineKind::User, 0.0, 10.0);
        let times: Vec<f64> = user.iter().map(|s| s.timestamp).collect();
        assert_eq!(times.len(), 2);
        assert_relative_eq!(times[0], 2.0);
        assert_relative_eq!(times[1], 2.1);
        assert_eq!(user[0].pitch, None);

        let sections = session.sections();
        assert_eq!(sections.len(), 1);
        assert_relative_eq!(sections[0].start_time, 2.0);
        assert_relative_eq!(sections[0].end_time, 2.6);
        assert_eq!(sections[0].direction, pitchcoach_common::PitchDirection::Above);

        assert!(matches!(
            updates.try_recv(),
            Ok(SessionUpdate::SectionsChanged(s)) if s.len() == 1
        ));
    }

    #[test]
    fn test_stale_generation_ignored() {
        let mut session = session_with_reference(10.0);
        begin(&mut session, Instant::now());
        begin(&mut session, Instant::now());
        assert_eq!(session.generation(), 2);

        session.handle_event(pitch_update(0.0, vec![PitchSample::new(1.0, Some(200.0))], vec![]));
        session.handle_event(SessionEvent::ChannelClosed { generation: 1 });

        assert_eq!(session.store().len(TimelineKind::User), 0);
        assert_eq!(session.status(), &SessionStatus::Performing);
    }

    #[test]
    fn test_stop_then_complete() {
        let mut session = session_with_reference(10.0);
        let mut updates = session.subscribe();
        begin(&mut session, Instant::now());

        session.handle_event(SessionEvent::StopRequested { generation: 1 });
        assert_eq!(session.status(), &SessionStatus::Finishing);

        // Late results are still merged while finishing
        session.handle_event(pitch_update(3.0, vec![PitchSample::new(0.0, Some(200.0))], vec![]));
        assert_eq!(session.store().len(TimelineKind::User), 1);

        session.handle_event(SessionEvent::Inbound {
            generation: 1,
            message: ServerMessage::PerformanceComplete {
                message: Some("Performance analysis complete".into()),
            },
        });
        assert_eq!(session.status(), &SessionStatus::Completed);

        let seen: Vec<SessionUpdate> = std::iter::from_fn(|| updates.try_recv().ok()).collect();
        assert!(seen.contains(&SessionUpdate::StatusChanged(SessionStatus::Finishing)));
        assert!(seen.contains(&SessionUpdate::PerformanceComplete {
            message: Some("Performance analysis complete".into())
        }));
        assert_eq!(
            seen.last(),
            Some(&SessionUpdate::StatusChanged(SessionStatus::Completed))
        );
    }

    fn handle_queued(session: &mut PerformanceSession) {
        while let Ok(event) = session.events_rx.try_recv() {
            session.handle_event(event);
        }
    }

    #[test]
    fn test_queued_stop_ignored_by_next_attempt() {
        let mut session = session_with_reference(10.0);
        let control = session.control();
        begin(&mut session, Instant::now());

        control.stop();
        handle_queued(&mut session);
        assert_eq!(session.status(), &SessionStatus::Finishing);

        // Impatient second press, still queued when the analyzer confirms
        control.stop();
        session.handle_event(SessionEvent::Inbound {
            generation: 1,
            message: ServerMessage::PerformanceComplete { message: None },
        });
        assert_eq!(session.status(), &SessionStatus::Completed);

        begin(&mut session, Instant::now());
        handle_queued(&mut session);
        assert_eq!(session.status(), &SessionStatus::Performing);

        control.abort();
        handle_queued(&mut session);
        assert_eq!(session.status(), &SessionStatus::Aborted);
    }

    #[test]
    fn test_close_while_finishing_completes() {
        let mut session = session_with_reference(10.0);
        begin(&mut session, Instant::now());
        session.handle_event(SessionEvent::StopRequested { generation: 1 });
        session.handle_event(SessionEvent::ChannelClosed { generation: 1 });
        assert_eq!(session.status(), &SessionStatus::Completed);
    }

    #[test]
    fn test_second_stop_aborts() {
        let mut session = session_with_reference(10.0);
        begin(&mut session, Instant::now());
        session.handle_event(SessionEvent::StopRequested { generation: 1 });
        session.handle_event(SessionEvent::StopRequested { generation: 1 });
        assert_eq!(session.status(), &SessionStatus::Aborted);

        // Further requests are no-ops
        session.handle_event(SessionEvent::AbortRequested { generation: 1 });
        session.handle_event(SessionEvent::StopRequested { generation: 1 });
        assert_eq!(session.status(), &SessionStatus::Aborted);
    }

    #[test]
    fn test_channel_failure_disconnects() {
        let mut session = session_with_reference(10.0);
        begin(&mut session, Instant::now());
        session.handle_event(SessionEvent::ChannelFailed {
            generation: 1,
            reason: "connection reset".into(),
        });
        assert_eq!(
            session.status(),
            &SessionStatus::Disconnected {
                reason: "connection reset".into()
            }
        );
    }

    #[test]
    fn test_frame_publishes_window_and_auto_finishes() {
        let mut session = session_with_reference(2.0);
        let mut updates = session.subscribe();
        let t0 = Instant::now();
        begin(&mut session, t0);

        session.on_frame(t0 + Duration::from_millis(500));
        match updates.try_recv() {
            Ok(SessionUpdate::Frame { position, window }) => {
                assert_relative_eq!(position, 0.5);
                assert_relative_eq!(window[0].time, 0.0);
                assert_eq!(window[0].reference, Some(220.0));
                assert!(window.iter().all(|p| p.time <= 2.0 + 1e-9));
            }
            other => panic!("expected a frame, got {:?}", other),
        }

        session.on_frame(t0 + Duration::from_secs(5));
        assert_relative_eq!(session.current_time(), 2.0);
        assert_eq!(session.status(), &SessionStatus::Finishing);
    }

    #[test]
    fn test_audio_recorded_only_while_performing() {
        let mut session = session_with_reference(10.0);
        session.enable_recording();
        let block = |sequence| AudioBlock {
            samples: vec![0.1; 4],
            sample_rate: 16000,
            sequence,
        };

        session.handle_event(SessionEvent::AudioBlock {
            generation: 0,
            block: block(0),
        });
        assert!(session.recording().unwrap().is_empty());

        begin(&mut session, Instant::now());
        session.handle_event(SessionEvent::AudioBlock {
            generation: 1,
            block: block(0),
        });
        assert_relative_eq!(session.recording().unwrap().duration_secs(), 4.0 / 16000.0);
    }

    #[tokio::test]
    async fn test_start_fails_without_analyzer() {
        let mut session = session_with_reference(1.0);
        session.config.server_url = "ws://127.0.0.1:9/ws".into();

        let result = session.start_performance().await;
        assert!(matches!(result, Err(SessionError::Transport(_))));
        assert!(matches!(session.status(), SessionStatus::Disconnected { .. }));
        assert!(session.channel.is_none());
    }

    #[test]
    fn test_report() {
        let mut session = session_with_reference(4.0);
        begin(&mut session, Instant::now());
        session.handle_event(pitch_update(
            0.0,
            vec![PitchSample::new(1.0, Some(250.0))],
            vec![comparison(1.0, 35.0), comparison(1.3, 35.0), comparison(1.6, 35.0)],
        ));

        let report = session.report();
        assert_eq!(report.duration, Some(4.0));
        assert_eq!(report.user_samples, 1);
        assert_eq!(report.dropped_audio_chunks, 0);
        assert_eq!(report.analyzed_sections.len(), 1);
        assert_eq!(report.status, SessionStatus::Performing);
    }
}
