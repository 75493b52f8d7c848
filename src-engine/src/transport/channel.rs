//! WebSocket channel to the analyzer.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use pitchcoach_common::protocol::{ClientMessage, ServerMessage};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use super::{OutboundQueue, TransportConfig};
use crate::error::TransportError;

/// Something that happened on the channel, delivered to its handler.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// A decoded analyzer message
    Message(ServerMessage),
    /// The peer closed the channel
    Closed,
    /// The channel failed
    Failed(String),
}

/// An open analyzer channel.
///
/// Closing is idempotent: queued messages are flushed, a close frame is
/// sent, and the handler receives nothing further from this channel.
pub struct Channel {
    url: String,
    queue: Arc<OutboundQueue>,
    open: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

impl Channel {
    /// Connect to `url` and start the reader and writer tasks.
    ///
    /// `handler` runs on the reader task for every inbound message and once
    /// when the channel ends for a reason other than a local `close`.
    pub async fn open<F>(
        url: &str,
        config: &TransportConfig,
        handler: F,
    ) -> Result<Self, TransportError>
    where
        F: Fn(ChannelEvent) + Send + Sync + 'static,
    {
        let (socket, _) = connect_async(url)
            .await
            .map_err(|e| TransportError::Connect {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        info!("Connected to analyzer at {}", url);

        let (mut sink, mut stream) = socket.split();
        let queue = Arc::new(OutboundQueue::new(config.outbound_queue_capacity));
        let open = Arc::new(AtomicBool::new(true));
        let handler = Arc::new(handler);

        {
            let queue = queue.clone();
            let open = open.clone();
            let handler = handler.clone();
            tokio::spawn(async move {
                while let Some(message) = queue.pop().await {
                    let text = match message.encode() {
                        Ok(text) => text,
                        Err(e) => {
                            error!("Dropping outbound message: {}", e);
                            continue;
                        }
                    };
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        if open.swap(false, Ordering::SeqCst) {
                            queue.close();
                            handler(ChannelEvent::Failed(e.to_string()));
                        }
                        return;
                    }
                }
                if let Err(e) = sink.close().await {
                    debug!("Close handshake failed: {}", e);
                }
            });
        }

        let reader = {
            let queue = queue.clone();
            let open = open.clone();
            tokio::spawn(async move {
                let outcome = loop {
                    match stream.next().await {
                        Some(Ok(Message::Text(text))) => match ServerMessage::decode(&text) {
                            Ok(message) => {
                                if open.load(Ordering::SeqCst) {
                                    handler(ChannelEvent::Message(message));
                                }
                            }
                            Err(e) => warn!("Dropping analyzer message: {}", e),
                        },
                        Some(Ok(Message::Binary(bytes))) => {
                            warn!("Dropping unexpected binary frame ({} bytes)", bytes.len());
                        }
                        Some(Ok(Message::Close(frame))) => {
                            debug!("Analyzer closed the channel: {:?}", frame);
                            break ChannelEvent::Closed;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => break ChannelEvent::Failed(e.to_string()),
                        None => break ChannelEvent::Closed,
                    }
                };

                if open.swap(false, Ordering::SeqCst) {
                    queue.close();
                    handler(outcome);
                }
            })
        };

        Ok(Self {
            url: url.to_string(),
            queue,
            open,
            reader,
        })
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Queue a message for sending.
    pub fn send(&self, message: ClientMessage) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::ChannelClosed);
        }
        self.queue.push(message)
    }

    /// Audio chunks dropped by the outbound queue so far.
    pub fn dropped_audio(&self) -> u64 {
        self.queue.dropped_audio()
    }

    /// Close the channel. Safe to call more than once.
    pub fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            info!("Closing analyzer channel");
            self.queue.close();
            self.reader.abort();
        }
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("url", &self.url)
            .field("open", &self.is_open())
            .field("queued", &self.queue.len())
            .finish()
    }
}
