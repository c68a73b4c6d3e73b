//! Broadcast of overlay trace entries to live observers.

use tokio::sync::broadcast;

use crate::runner::TraceEntry;

/// Hub broadcasting trace entries while a scenario runs in realtime.
#[derive(Debug, Clone)]
pub struct NoticeHub {
    sender: broadcast::Sender<TraceEntry>,
}

impl NoticeHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send an entry to every subscriber.
    pub fn send(&self, entry: TraceEntry) {
        // No receivers is fine
        let _ = self.sender.send(entry);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TraceEntry> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NoticeHub {
    fn default() -> Self {
        Self::new()
    }
}
