//! # pollvisor
//!
//! **Pollvisor** is a visibility-aware polling engine for async Rust.
//!
//! It repeatedly invokes an asynchronous, cancelable [`Source`] on a fixed
//! interval while the host surface is in the foreground, delivers each
//! successful value to the consumer, and recovers from failures with a
//! bounded retry budget and a pluggable backoff strategy.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌──────────────┐   ┌──────────────────┐   ┌──────────────┐
//!   │    Source    │   │ VisibilitySignal │   │  PollConfig  │
//!   │ (user fetch) │   │  (host-driven)   │   │  (validated) │
//!   └──────┬───────┘   └────────┬─────────┘   └──────┬───────┘
//!          ▼                    ▼                    ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Poller::spawn()                                                  │
//! │  - Bus (broadcast events, per-session sequence numbers)           │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! │  - PollDriver (tokio task)                                        │
//! └──────┬─────────────────────────────────────────────────────┬──────┘
//!        ▼                                                     ▼
//! ┌──────────────────────────────┐                  ┌────────────────────┐
//! │ PollDriver                   │ Ok / PollError   │    PollSession     │
//! │ - visibility gate            │ ───────────────► │ recv() / Stream    │
//! │ - tick grid (switch-latest)  │                  │ cancel() / join()  │
//! │ - recovery (budget, backoff) │                  └────────────────────┘
//! └──────┬───────────────────────┘
//!        │ Publishes: SessionStarted, VisibilityChanged, PollStarting,
//!        │ PollSucceeded, PollFailed, TickSuperseded, BackoffScheduled,
//!        │ StrategyFallback, RetriesExhausted, SessionCancelled,
//!        │ SessionAborted
//!        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                          ┌─────────┼─────────┐
//!                          ▼         ▼         ▼
//!                       worker1   worker2   workerN
//! ```
//!
//! ### Lifecycle
//! ```text
//! hidden ──(becomes visible)──► activation:
//!   consecutive := 0
//!   loop {
//!     tick now, then every interval:
//!       ├─ next tick before result ─► cancel in-flight call, TickSuperseded
//!       ├─ Ok(v)  ─► consecutive := 0, deliver v
//!       └─ Err(e) ─► consecutive += 1
//!            ├─ consecutive > attempts ─► deliver PollError::Exhausted, end
//!            └─ sleep backoff(consecutive), restart the grid
//!   }
//! visible ──(becomes hidden)──► activation dropped, in-flight call cancelled
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                              |
//! |-------------------|---------------------------------------------------------------|-------------------------------------------------|
//! | **Sessions**      | Start, consume and cancel polling sessions.                   | [`Poller`], [`poll`], [`PollSession`], [`CancelHandle`] |
//! | **Sources**       | Define what gets polled, as a trait or a closure.             | [`Source`], [`SourceFn`]                        |
//! | **Policies**      | Retry budget and backoff strategy.                            | [`PollConfig`], [`BackoffPolicy`], [`BackoffStrategy`] |
//! | **Host**          | Foreground signal and clock.                                  | [`VisibilitySignal`], [`Scheduler`]             |
//! | **Subscriber API**| Hook into session events (logging, metrics, custom).          | [`Subscribe`], [`Event`], [`EventKind`]         |
//! | **Errors**        | Terminal session error and configuration errors.              | [`PollError`], [`ConfigError`]                  |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] subscriber that renders events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use pollvisor::{BackoffStrategy, PollConfig, Poller, SourceFn, VisibilitySignal};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let visibility = VisibilitySignal::new(true);
//!
//!     let cfg = PollConfig::new(Duration::from_millis(20))
//!         .with_attempts(3)
//!         .with_strategy(BackoffStrategy::Exponential)
//!         .with_exponential_unit(Duration::from_millis(10));
//!
//!     let source = SourceFn::new("counter", |_ctx: CancellationToken| async move {
//!         Ok::<_, std::io::Error>(42u32)
//!     });
//!
//!     let mut session = Poller::new(source, cfg)
//!         .with_visibility(&visibility)
//!         .spawn()?;
//!
//!     if let Some(item) = session.recv().await {
//!         println!("got {}", item?);
//!     }
//!     session.cancel();
//!     session.join().await;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod policies;
mod sources;
mod subscribers;

// ---- Public re-exports ----

pub use config::PollConfig;
pub use core::{
    CancelHandle, DEFAULT_BUS_CAPACITY, PollSession, Poller, Scheduler, TokioScheduler,
    VisibilitySignal, poll,
};
pub use error::{ConfigError, PollError};
pub use events::{Bus, Event, EventKind};
pub use policies::{BackoffPolicy, BackoffStrategy};
pub use sources::{BoxSourceFuture, Source, SourceFn};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a built-in tracing subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
