//! Persistent duplex channel to the remote pitch analyzer.
//!
//! Outbound messages go through a capped queue drained by a writer task;
//! inbound frames are decoded by a reader task and handed to the channel's
//! event handler in arrival order.

mod channel;
mod queue;

pub use channel::{Channel, ChannelEvent};
pub use queue::OutboundQueue;

use serde::Deserialize;

/// Transport settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Unsent messages kept before the oldest audio chunk is dropped
    pub outbound_queue_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            outbound_queue_capacity: 64,
        }
    }
}
