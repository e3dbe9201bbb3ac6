//! # Event subscribers for polling sessions.
//!
//! This module provides the [`Subscribe`] trait and the fan-out machinery that
//! delivers session events published on the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   driver ── publish(Event) ──► Bus ──► subscriber listener ──► SubscriberSet
//!                                                                   │
//!                                                    ┌──────────────┼──────────┐
//!                                                    ▼              ▼          ▼
//!                                                LogWriter       Metrics     Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use pollvisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::PollFailed {
//!             // increment failure counter
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
