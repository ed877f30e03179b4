use futures::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::debug;
use vidstream_contract::{ClientEvent, EventSink};

pub const EVENT_BUS_CAPACITY: usize = 256;

/// Broadcast bus shared by the list, player and uploader.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self { sender }
    }

    pub fn receiver(&self) -> broadcast::Receiver<ClientEvent> {
        self.sender.subscribe()
    }

    /// Lagged items are skipped silently.
    pub fn subscribe(&self) -> impl Stream<Item = ClientEvent> + Send + 'static {
        BroadcastStream::new(self.sender.subscribe()).filter_map(|item| async move { item.ok() })
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventBus {
    fn publish(&self, event: ClientEvent) -> usize {
        debug!(event_type = event.event_type(), "publishing client event");
        self.sender.send(event).unwrap_or(0)
    }
}
