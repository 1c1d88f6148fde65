use std::sync::Arc;

use dispatch::store::BroadcastSink;
use serde::Serialize;
use tokio::sync::broadcast;

/// A message published on one of the realtime channels.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub channel: String,
    pub payload: serde_json::Value,
}

/// Hands published messages to every connected realtime client. Clients
/// that fall behind by more than the channel capacity miss messages.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: broadcast::Sender<Arc<Envelope>>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Envelope>> {
        self.sender.subscribe()
    }
}

impl BroadcastSink for ChannelSink {
    fn publish(&self, channel: &str, payload: serde_json::Value) {
        let envelope = Envelope {
            channel: channel.to_owned(),
            payload,
        };
        // fails only if nobody is listening
        if self.sender.send(Arc::new(envelope)).is_err() {
            log::trace!("no subscribers for {}", channel);
        }
    }
}
