//! # Recovery state machine.
//!
//! Decides what happens after each settled invocation:
//!
//! ```text
//!            ┌────────── tick ──────────┐
//!            ▼                          │
//!   Idle ─► Invoking ─► Succeeded ──────┘   (consecutive := 0)
//!                 │
//!                 └──► Failed ─► consecutive > attempts ? ─► Exhausted (terminal)
//!                                     │ no
//!                                     └─► Retry { delay = backoff(consecutive) }
//! ```
//!
//! ## Counters
//! Two counters are kept: the **lifetime** count of failures in the session and
//! a **baseline** re-recorded on every success. The consecutive count is their
//! difference. Backoff only ever sees the consecutive count, so an unrelated
//! failure after a recovery starts a fresh ramp (`unit`, `2×unit`, ...) instead
//! of continuing the previous one.
//!
//! The baseline is also re-recorded whenever the host becomes visible again:
//! a background transition discards retry progress.

use std::time::Duration;

use crate::policies::{BackoffPolicy, BackoffStrategy};

/// Failure counters of one session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ErrorCounters {
    lifetime: u32,
    baseline: u32,
}

impl ErrorCounters {
    /// Records a failure and returns the new consecutive count.
    pub(crate) fn record_failure(&mut self) -> u32 {
        self.lifetime = self.lifetime.saturating_add(1);
        self.consecutive()
    }

    /// Starts a fresh run: the next failure counts as the first.
    pub(crate) fn reset_run(&mut self) {
        self.baseline = self.lifetime;
    }

    /// Failures since the last success (or activation).
    pub(crate) fn consecutive(&self) -> u32 {
        self.lifetime - self.baseline
    }

    /// Failures since the session started.
    #[cfg(test)]
    pub(crate) fn lifetime(&self) -> u32 {
        self.lifetime
    }
}

/// Decision taken after a failed invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RecoveryStep {
    /// Wait `delay`, then resume polling with an immediate tick.
    Retry { delay: Duration, failures: u32 },
    /// Budget spent; surface the error and end the session.
    Exhausted { failures: u32 },
}

/// Retry budget plus backoff policy, applied to the session's counters.
#[derive(Clone, Debug)]
pub(crate) struct Recovery {
    policy: BackoffPolicy,
    attempts: u32,
    counters: ErrorCounters,
}

impl Recovery {
    pub(crate) fn new(policy: BackoffPolicy, attempts: u32) -> Self {
        Self {
            policy,
            attempts,
            counters: ErrorCounters::default(),
        }
    }

    /// Called when the host becomes visible and a new activation starts.
    pub(crate) fn begin_activation(&mut self) {
        self.counters.reset_run();
    }

    /// Called after an invocation delivered a value.
    pub(crate) fn on_success(&mut self) {
        self.counters.reset_run();
    }

    /// Called after an invocation failed.
    pub(crate) fn on_failure(&mut self) -> RecoveryStep {
        let failures = self.counters.record_failure();
        if failures > self.attempts {
            return RecoveryStep::Exhausted { failures };
        }
        RecoveryStep::Retry {
            delay: self.policy.delay(failures),
            failures,
        }
    }

    /// Name of the configured strategy if it is not a known one.
    pub(crate) fn unrecognized_strategy(&self) -> Option<&str> {
        match &self.policy.strategy {
            BackoffStrategy::Unrecognized(name) => Some(name.as_ref()),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn counters(&self) -> ErrorCounters {
        self.counters
    }
}
