//! # Scheduling capability.
//!
//! The engine never touches a clock directly: every tick and every backoff
//! wait goes through a [`Scheduler`]. The default [`TokioScheduler`] uses
//! `tokio::time`, so tests that call `tokio::time::pause()` (or use
//! `#[tokio::test(start_paused = true)]`) run in deterministic virtual time.
//!
//! Custom schedulers can record requested delays, scale time, or bridge to a
//! host event loop.

use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};
use tokio::time::Instant;

/// Source of "now" and of timed wake-ups.
pub trait Scheduler: Send + Sync + 'static {
    /// Current instant on this scheduler's clock.
    fn now(&self) -> Instant;

    /// Future that completes at `deadline` (immediately if it already passed).
    fn sleep_until(&self, deadline: Instant) -> BoxFuture<'static, ()>;

    /// Future that completes after `delay`.
    ///
    /// Delays that overflow the clock never complete.
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()> {
        match self.now().checked_add(delay) {
            Some(deadline) => self.sleep_until(deadline),
            None => future::pending().boxed(),
        }
    }
}

/// Default scheduler backed by `tokio::time`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&self, deadline: Instant) -> BoxFuture<'static, ()> {
        tokio::time::sleep_until(deadline).boxed()
    }
}
