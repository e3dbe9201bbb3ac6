//! # Session observers
//!
//! Implement [`Subscribe`] to watch a polling session: count failures, export
//! backoff delays, mirror events into an audit log. Hand the observers to
//! [`Poller::with_subscribers`](crate::Poller::with_subscribers).
//!
//! Every observer gets its own worker task and event queue, so a slow
//! `on_event` only delays that observer. When its queue is full the event is
//! skipped for it and a `SubscriberOverflow` event goes on the bus.

use crate::events::Event;
use async_trait::async_trait;

/// Observer of one polling session's events.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Called once per event, in publication order.
    async fn on_event(&self, event: &Event);

    /// Name reported in overflow and panic events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Events buffered for this observer before new ones are skipped.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
