//! # Source abstraction.
//!
//! A [`Source`] is the opaque producer polled by the engine. Every tick calls
//! [`Source::fetch`] once and awaits a single `Ok(value)` or `Err(error)`.
//!
//! Each invocation receives its own [`CancellationToken`]. The engine cancels
//! it (and drops the future) when the invocation is superseded by the next
//! tick, by a visibility change, or by session cancellation. Sources that hold
//! resources beyond the future (spawned requests, leases) should watch it.

use std::{fmt, future::Future, pin::Pin};

use tokio_util::sync::CancellationToken;

/// Future produced by one invocation of a [`Source`].
pub type BoxSourceFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'static>>;

/// # Asynchronous, cancelable producer.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use pollvisor::{BoxSourceFuture, Source};
///
/// struct Clock;
///
/// impl Source for Clock {
///     type Output = std::time::SystemTime;
///     type Error = std::io::Error;
///
///     fn name(&self) -> &str { "clock" }
///
///     fn fetch(&self, _ctx: CancellationToken) -> BoxSourceFuture<Self::Output, Self::Error> {
///         Box::pin(async { Ok(std::time::SystemTime::now()) })
///     }
/// }
/// ```
pub trait Source: Send + Sync + 'static {
    /// Value delivered to the subscriber on success.
    type Output: Send + 'static;
    /// Error of a single invocation; rendered into events via `Display`.
    type Error: fmt::Display + Send + 'static;

    /// Returns a stable, human-readable name (used in events and logs).
    fn name(&self) -> &str;

    /// Starts one invocation.
    ///
    /// Called anew on every tick; the returned future must not be reused.
    fn fetch(&self, ctx: CancellationToken) -> BoxSourceFuture<Self::Output, Self::Error>;
}
