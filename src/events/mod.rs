//! Session events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events of one polling session.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`, stamps per-session sequence numbers
//!
//! ## Quick reference
//! - **Publishers**: `core::driver` (gate, loop, recovery), `core::runner`,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the session's subscriber listener, which fans out to
//!   [`SubscriberSet`](crate::SubscriberSet).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
