//! Capped outbound queue shared between the session and the writer task.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use pitchcoach_common::protocol::ClientMessage;
use tokio::sync::Notify;
use tracing::warn;

use crate::error::TransportError;

#[derive(Debug, Default)]
struct QueueState {
    messages: VecDeque<ClientMessage>,
    closed: bool,
    dropped_audio: u64,
}

/// Outbound message queue with a drop-oldest-audio overflow policy.
///
/// Pushing never blocks. When the queue is full the oldest unsent audio
/// chunk is discarded to make room; control messages are always kept.
#[derive(Debug)]
pub struct OutboundQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    capacity: usize,
}

impl OutboundQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue a message for the writer task.
    pub fn push(&self, message: ClientMessage) -> Result<(), TransportError> {
        {
            let mut state = self.lock();
            if state.closed {
                return Err(TransportError::ChannelClosed);
            }

            if state.messages.len() >= self.capacity {
                if let Some(idx) = state.messages.iter().position(ClientMessage::is_audio) {
                    state.messages.remove(idx);
                    state.dropped_audio += 1;
                    if state.dropped_audio == 1 || state.dropped_audio % 100 == 0 {
                        warn!(
                            "Outbound queue full, dropped {} audio chunk(s) so far",
                            state.dropped_audio
                        );
                    }
                }
            }

            state.messages.push_back(message);
        }
        self.notify.notify_one();
        Ok(())
    }

    /// Wait for the next message. Returns `None` once the queue is closed
    /// and everything queued before the close has been taken.
    pub async fn pop(&self) -> Option<ClientMessage> {
        loop {
            {
                let mut state = self.lock();
                if let Some(message) = state.messages.pop_front() {
                    return Some(message);
                }
                if state.closed {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    /// Refuse further pushes and wake the writer.
    pub fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_one();
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().messages.len()
    }

    /// Audio chunks discarded because the queue was full.
    pub fn dropped_audio(&self) -> u64 {
        self.lock().dropped_audio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn chunk(value: f32) -> ClientMessage {
        ClientMessage::audio_chunk(&[value])
    }

    #[tokio::test]
    async fn test_overflow_drops_oldest_audio() {
        let queue = OutboundQueue::new(3);
        queue.push(ClientMessage::SongPosition { position: 0.0 }).unwrap();
        queue.push(chunk(1.0)).unwrap();
        queue.push(chunk(2.0)).unwrap();
        queue.push(chunk(3.0)).unwrap();

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.dropped_audio(), 1);

        queue.close();
        let mut drained = Vec::new();
        while let Some(m) = queue.pop().await {
            drained.push(m);
        }
        assert_eq!(
            drained,
            vec![
                ClientMessage::SongPosition { position: 0.0 },
                chunk(2.0),
                chunk(3.0)
            ]
        );
    }

    #[test]
    fn test_control_messages_never_dropped() {
        let queue = OutboundQueue::new(1);
        queue.push(ClientMessage::SongPosition { position: 1.0 }).unwrap();
        queue.push(ClientMessage::EndPerformance).unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.dropped_audio(), 0);
    }

    #[test]
    fn test_push_after_close_fails() {
        let queue = OutboundQueue::new(4);
        queue.close();
        queue.close();
        assert!(matches!(
            queue.push(ClientMessage::EndPerformance),
            Err(TransportError::ChannelClosed)
        ));
    }

    #[tokio::test]
    async fn test_pop_wakes_on_push() {
        let queue = Arc::new(OutboundQueue::new(4));
        let writer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.pop().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.push(ClientMessage::EndPerformance).unwrap();

        let received = tokio::time::timeout(Duration::from_secs(1), writer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received, Some(ClientMessage::EndPerformance));
    }
}
