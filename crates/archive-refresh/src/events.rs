//! Local event bus for refresh notifications.
//!
//! The service emits events after its work is committed remotely; the
//! presentation layer subscribes and decides what they mean. Emission
//! with no subscribers is not an error.

use tokio::sync::broadcast;
use uuid::Uuid;

const BUS_CAPACITY: usize = 16;

/// An event observable by presentation-layer collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshEvent {
    /// A local reconciliation pass finished (regardless of per-arc
    /// outcomes).
    DailyRefreshCompleted { run_id: Uuid, arcs_processed: usize },
    /// The backend announced a refresh completion over the server-push
    /// channel.
    ServerRefreshComplete,
}

/// Broadcast bus for [`RefreshEvent`]s.
#[derive(Clone)]
pub struct RefreshEvents {
    tx: broadcast::Sender<RefreshEvent>,
}

impl RefreshEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.tx.subscribe()
    }

    /// Emit an event. Dropped silently when nobody listens.
    pub fn emit(&self, event: RefreshEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for RefreshEvents {
    fn default() -> Self {
        Self::new()
    }
}
