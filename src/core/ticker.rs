//! # Poll loop clock.
//!
//! [`Ticker`] produces the tick grid of one run of the poll loop: the first
//! tick is due at creation, the following ones every `interval` after it.
//!
//! ```text
//! start            start+i          start+2i         start+3i
//!   │ tick           │ tick            │ tick            │ tick ...
//! ```
//!
//! A new `Ticker` is created on every activation and after every backoff, so
//! polling always resumes with an immediate tick. If the clock jumps past one
//! or more ticks (stalled runtime), the grid is re-anchored to now instead of
//! firing the missed ticks in a burst.

use std::{sync::Arc, time::Duration};

use futures::future::{self, BoxFuture, FutureExt};
use tokio::time::Instant;

use crate::core::scheduler::Scheduler;

/// Tick grid for one run of the poll loop.
pub(crate) struct Ticker {
    scheduler: Arc<dyn Scheduler>,
    interval: Duration,
    /// Next due tick; `None` once the grid overflows the clock.
    next: Option<Instant>,
}

impl Ticker {
    /// Starts a grid whose first tick is due immediately.
    pub(crate) fn start(scheduler: Arc<dyn Scheduler>, interval: Duration) -> Self {
        let now = scheduler.now();
        Self {
            scheduler,
            interval,
            next: Some(now),
        }
    }

    /// Future that completes when the pending tick is due.
    pub(crate) fn due(&self) -> BoxFuture<'static, ()> {
        match self.next {
            Some(deadline) => self.scheduler.sleep_until(deadline),
            None => future::pending().boxed(),
        }
    }

    /// Marks the pending tick as fired and schedules the following one.
    pub(crate) fn advance(&mut self) {
        let Some(fired) = self.next else {
            return;
        };
        let now = self.scheduler.now();
        self.next = match fired.checked_add(self.interval) {
            Some(next) if now >= next => now.checked_add(self.interval),
            other => other,
        };
    }

    /// Waits for the pending tick, then advances the grid.
    pub(crate) async fn tick(&mut self) {
        self.due().await;
        self.advance();
    }
}
