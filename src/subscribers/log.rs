//! # LogWriter: session events as `tracing` records
//!
//! A subscriber that renders incoming [`Event`]s through `tracing`.
//! Routine poll traffic goes to `debug`, recovery to `info`/`warn`.
//! The strategy fallback is logged at `debug` here; the driver already warns
//! about it directly.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! DEBUG poll starting source="comments" attempt=1
//!  WARN poll failed source="comments" attempt=3 failures=1 err="503"
//!  INFO backoff scheduled source="comments" failures=1 delay_ms=1000 err="503"
//! ERROR retries exhausted source="comments" failures=10 err="503"
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let source = e.source.as_deref().unwrap_or("unknown");
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::SessionStarted => {
                info!(source, visible = ?e.visible, "polling session started");
            }
            EventKind::SessionCancelled => {
                info!(source, "polling session cancelled");
            }
            EventKind::SessionAborted => {
                error!(source, info = reason, "polling session aborted");
            }
            EventKind::VisibilityChanged => {
                debug!(source, visible = ?e.visible, "visibility changed");
            }
            EventKind::PollStarting => {
                debug!(source, attempt = ?e.attempt, "poll starting");
            }
            EventKind::PollSucceeded => {
                debug!(source, attempt = ?e.attempt, "poll succeeded");
            }
            EventKind::TickSuperseded => {
                debug!(source, attempt = ?e.attempt, "tick superseded in-flight poll");
            }
            EventKind::PollFailed => {
                warn!(source, attempt = ?e.attempt, failures = ?e.failures, err = reason, "poll failed");
            }
            EventKind::BackoffScheduled => {
                info!(source, failures = ?e.failures, delay_ms = ?e.delay_ms, err = reason, "backoff scheduled");
            }
            EventKind::StrategyFallback => {
                debug!(source, strategy = reason, "backoff strategy fallback");
            }
            EventKind::RetriesExhausted => {
                error!(source, failures = ?e.failures, err = reason, "retries exhausted");
            }
            EventKind::SubscriberOverflow => {
                warn!(subscriber = source, reason, "subscriber dropped event");
            }
            EventKind::SubscriberPanicked => {
                error!(subscriber = source, info = reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(all(test, feature = "logging"))]
mod tests {
    use super::*;
    use std::time::Duration;

    const ALL_KINDS: [EventKind; 13] = [
        EventKind::SubscriberPanicked,
        EventKind::SubscriberOverflow,
        EventKind::SessionStarted,
        EventKind::SessionCancelled,
        EventKind::SessionAborted,
        EventKind::VisibilityChanged,
        EventKind::PollStarting,
        EventKind::PollSucceeded,
        EventKind::PollFailed,
        EventKind::TickSuperseded,
        EventKind::BackoffScheduled,
        EventKind::StrategyFallback,
        EventKind::RetriesExhausted,
    ];

    #[tokio::test]
    async fn test_renders_every_kind() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let writer = LogWriter::new();
        for kind in ALL_KINDS {
            let full = Event::new(kind)
                .with_source("comments")
                .with_attempt(3)
                .with_failures(2)
                .with_delay(Duration::from_millis(250))
                .with_reason("503")
                .with_visible(true);
            writer.on_event(&full).await;
            writer.on_event(&Event::new(kind)).await;
        }
        assert_eq!(writer.name(), "LogWriter");
    }
}
