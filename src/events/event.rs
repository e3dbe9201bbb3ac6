//! # Lifecycle events emitted by a polling session.
//!
//! The [`EventKind`] enum classifies events across four groups:
//! - **Session events**: start, cancellation, abort
//! - **Gate events**: foreground/background transitions
//! - **Poll events**: invocation flow (starting, succeeded, failed, superseded)
//! - **Recovery events**: backoff scheduling, strategy fallback, exhaustion
//!
//! The [`Event`] struct carries metadata such as timestamps, the source name,
//! consecutive failure counts and backoff delays.
//!
//! ## Ordering guarantees
//! Each event gets a sequence number (`seq`) from the session's [`Bus`](crate::events::Bus).
//! Numbers are monotonic within one session and start at 0 for every session.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use pollvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::BackoffScheduled)
//!     .with_source("comments")
//!     .with_failures(2)
//!     .with_delay(Duration::from_millis(20))
//!     .with_reason("503 Service Unavailable");
//!
//! assert_eq!(ev.kind, EventKind::BackoffScheduled);
//! assert_eq!(ev.source.as_deref(), Some("comments"));
//! assert_eq!(ev.delay(), Some(Duration::from_millis(20)));
//! ```

use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Classification of session events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: panic message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: "full" or "closed"
    SubscriberOverflow,

    // === Session events ===
    /// Session driver started.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `visible`: visibility at start
    SessionStarted,

    /// Session was cancelled by its handle (or the handle was dropped).
    ///
    /// Sets:
    /// - `source`: source name
    SessionCancelled,

    /// The session driver panicked (scheduler or source malfunction) and the
    /// session ended with [`PollError::Aborted`](crate::PollError::Aborted).
    ///
    /// Sets:
    /// - `source`: source name
    /// - `reason`: panic message
    SessionAborted,

    // === Gate events ===
    /// Host visibility changed; the current activation is discarded.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `visible`: new visibility
    VisibilityChanged,

    // === Poll events ===
    /// A tick fired and the source is being invoked.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `attempt`: invocation number (1-based, per session)
    PollStarting,

    /// The invocation produced a value that was forwarded to the subscriber.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `attempt`: invocation number
    PollSucceeded,

    /// The invocation failed.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `attempt`: invocation number
    /// - `failures`: consecutive failures including this one
    /// - `reason`: error message
    PollFailed,

    /// The next tick fired before the invocation settled; it was cancelled.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `attempt`: invocation number that was dropped
    TickSuperseded,

    // === Recovery events ===
    /// A retry was scheduled after a failure.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `failures`: consecutive failures so far
    /// - `delay_ms`: wait before polling resumes
    /// - `reason`: last error message
    BackoffScheduled,

    /// The configured strategy name is unknown; the constant delay was used.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `reason`: the unknown strategy name
    StrategyFallback,

    /// The retry budget is spent; the error was delivered and the session ends.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `failures`: consecutive failures (`attempts + 1`)
    /// - `reason`: final error message
    RetriesExhausted,
}

/// Session event with optional metadata.
///
/// - `seq`: per-session monotonic sequence
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Sequence number within the session, stamped by the bus.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the polled source (or subscriber for subscriber events).
    pub source: Option<Arc<str>>,
    /// Invocation number (starting from 1).
    pub attempt: Option<u64>,
    /// Consecutive failures since the last success.
    pub failures: Option<u32>,
    /// Backoff delay in milliseconds (compact).
    pub delay_ms: Option<u64>,
    /// Human-readable reason (errors, overflow details, strategy names).
    pub reason: Option<Arc<str>>,
    /// Host visibility, for gate events.
    pub visible: Option<bool>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp.
    ///
    /// `seq` is 0 until the event is published.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: 0,
            at: SystemTime::now(),
            kind,
            source: None,
            attempt: None,
            failures: None,
            delay_ms: None,
            reason: None,
            visible: None,
        }
    }

    /// Attaches a source name.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches an invocation number.
    #[inline]
    pub fn with_attempt(mut self, n: u64) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a consecutive failure count.
    #[inline]
    pub fn with_failures(mut self, n: u32) -> Self {
        self.failures = Some(n);
        self
    }

    /// Attaches a backoff delay (stored as milliseconds, saturating).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u64::MAX)) as u64;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the host visibility.
    #[inline]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Backoff delay as a [`Duration`], if set.
    #[inline]
    pub fn delay(&self) -> Option<Duration> {
        self.delay_ms.map(Duration::from_millis)
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_source(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_source(subscriber)
            .with_reason(info)
    }
}
