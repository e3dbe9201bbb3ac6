//! Backoff policies.
//!
//! This module groups the knobs that control **how long** the engine waits
//! before resuming polling after a failed invocation.
//!
//! ## Contents
//! - [`BackoffStrategy`] which delay formula is active (exponential / random / consecutive)
//! - [`BackoffPolicy`]   strategy plus its parameters, resolved from a [`PollConfig`](crate::PollConfig)
//! - `jitter`            uniform sampling used by the random strategy
//!
//! ## Quick wiring
//! ```text
//! PollConfig { backoff_strategy, exponential_unit, random_range, constant_time, interval }
//!      └─► BackoffPolicy::from_config()
//!           └─► core::recovery::Recovery uses policy.delay(consecutive_failures)
//! ```
//!
//! ## Defaults
//! - `BackoffStrategy::Exponential` with a 1s unit: 1s, 2s, 4s, ...
//! - Random range 1s..10s.
//! - Consecutive delay falls back to the poll interval.

mod backoff;
mod jitter;
mod strategy;

pub use backoff::BackoffPolicy;
pub use strategy::BackoffStrategy;
