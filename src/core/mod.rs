//! Engine core: session wiring and the poll loop.
//!
//! The public API from this module is [`Poller`] / [`poll`] (start a session),
//! [`PollSession`] / [`CancelHandle`] (consume and stop it), and the two host
//! capabilities [`Scheduler`] and [`VisibilitySignal`].
//!
//! Internal modules:
//! - [`driver`]: the per-session loop (visibility gate, tick grid, recovery);
//! - [`runner`]: one invocation of the source, racing the next tick;
//! - [`ticker`]: the interval grid with immediate first tick;
//! - [`recovery`]: failure counters, retry budget and backoff decisions.

mod builder;
mod driver;
mod recovery;
mod runner;
mod scheduler;
mod session;
mod ticker;
mod visibility;

pub use builder::{DEFAULT_BUS_CAPACITY, Poller, poll};
pub use scheduler::{Scheduler, TokioScheduler};
pub use session::{CancelHandle, PollSession};
pub use visibility::VisibilitySignal;
