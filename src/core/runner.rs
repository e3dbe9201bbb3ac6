//! # Run a single invocation of a source.
//!
//! Executes one `fetch` of a [`Source`] under a child cancellation token and
//! races it against the next tick of the poll grid.
//!
//! ## Outcomes
//! ```text
//! fetch settles first ──► Settled(Ok | Err)
//! next tick fires first ─► cancel child → publish TickSuperseded → Superseded
//! ```
//!
//! ## Rules
//! - Publishes `PollStarting` before the source is invoked
//! - A result that is ready at the same instant as the next tick wins
//! - The child token is cancelled whenever the invocation stops being awaited
//!   (superseded, settled, or dropped by the caller)
//! - Child cancellation does **not** affect the parent

use futures::future::BoxFuture;
use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::{
    events::{Bus, Event, EventKind},
    sources::Source,
};

/// Result of racing one invocation against the next tick.
#[derive(Debug)]
pub(crate) enum Outcome<T, E> {
    /// The source produced a value or an error.
    Settled(Result<T, E>),
    /// The next tick fired first; the invocation was cancelled and dropped.
    Superseded,
}

/// Invokes `source` once, publishing lifecycle events to `bus`.
///
/// `next_tick` completes when the following tick of the grid is due. The
/// invocation receives a child of `parent`, cancelled as soon as this future
/// returns or is dropped.
pub(crate) async fn run_once<S: Source + ?Sized>(
    source: &S,
    parent: &CancellationToken,
    attempt: u64,
    next_tick: BoxFuture<'static, ()>,
    bus: &Bus,
) -> Outcome<S::Output, S::Error> {
    let child = parent.child_token();
    let _guard = child.clone().drop_guard();

    bus.publish(
        Event::new(EventKind::PollStarting)
            .with_source(source.name())
            .with_attempt(attempt),
    );

    let fetch = source.fetch(child);
    select! {
        biased;
        res = fetch => Outcome::Settled(res),
        () = next_tick => {
            bus.publish(
                Event::new(EventKind::TickSuperseded)
                    .with_source(source.name())
                    .with_attempt(attempt),
            );
            Outcome::Superseded
        }
    }
}
