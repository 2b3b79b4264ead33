//! # Event bus for broadcasting gate events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from the gate, the reconciler and event sources.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                   Subscriber (one):
//!   Gate        ──┐
//!   Reconciler  ──┼──────► Bus ───────► subscriber listener ────► SubscriberSet
//!   Source loop ──┘  (broadcast chan)     (spawned by GateBuilder)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks. Publishing happens while the
//!   in-flight lock is held, so this matters.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active receivers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for gate events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_receiver_sees_events_after_subscribe() {
        let bus = Bus::new(8);
        bus.publish(Event::new(EventKind::SourceClosed));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::JobLaunched).with_job("a"));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::JobLaunched);
        assert_eq!(ev.job.as_deref(), Some("a"));
    }

    #[test]
    fn test_publish_without_receivers_is_noop() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::SourceClosed));
    }
}
