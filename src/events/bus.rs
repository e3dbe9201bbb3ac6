//! # Event bus for broadcasting session events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from the session driver and subscriber workers.
//!
//! ## Architecture
//! ```text
//! Publishers:                        Consumer (one per session):
//!   driver  ──┐
//!   runner  ──┼──────► Bus ───────► subscriber listener ────► SubscriberSet
//!   workers ──┘  (broadcast chan)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Per-session ordering**: every published event gets the next `seq` of this bus.
//! - **Bounded capacity**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active receivers at send time.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for session events.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: clones share the channel and the sequence counter.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
    seq: Arc<AtomicU64>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self {
            tx,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Stamps the next sequence number and publishes the event to all receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, mut ev: Event) {
        ev.seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    ///
    /// A receiver only gets events **sent after** it subscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_sequence_is_per_bus() {
        let a = Bus::new(8);
        let b = Bus::new(8);
        let mut rx_a = a.subscribe();
        let mut rx_b = b.subscribe();

        a.publish(Event::new(EventKind::SessionStarted));
        a.publish(Event::new(EventKind::PollStarting));
        b.publish(Event::new(EventKind::SessionStarted));

        assert_eq!(rx_a.recv().await.unwrap().seq, 0);
        assert_eq!(rx_a.recv().await.unwrap().seq, 1);
        assert_eq!(rx_b.recv().await.unwrap().seq, 0);
    }

    #[test]
    fn test_publish_without_receivers_is_noop() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::SessionStarted));
        let mut rx = bus.subscribe();
        assert!(rx.try_recv().is_err());
    }
}
