//! # Backoff policy for resuming after failed invocations.
//!
//! [`BackoffPolicy`] maps the number of **consecutive** failures `n` (1-based)
//! to the wait before the poll loop resumes:
//!
//! | strategy        | delay for the n-th consecutive failure           |
//! |-----------------|--------------------------------------------------|
//! | `Exponential`   | `2^(n-1) × exponential_unit`, capped at `Duration::MAX` |
//! | `Random`        | uniform in `[random_range.start, random_range.end)` |
//! | `Consecutive`   | `constant`                                       |
//! | `Unrecognized`  | `constant`                                       |
//!
//! The policy is stateless: callers pass the consecutive count, so a success
//! that resets the count also resets the exponential ramp.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use pollvisor::{BackoffPolicy, BackoffStrategy, PollConfig};
//!
//! let cfg = PollConfig::new(Duration::from_millis(60))
//!     .with_exponential_unit(Duration::from_millis(10));
//! let backoff = BackoffPolicy::from_config(&cfg);
//!
//! assert_eq!(backoff.strategy, BackoffStrategy::Exponential);
//! assert_eq!(backoff.delay(1), Duration::from_millis(10));
//! assert_eq!(backoff.delay(2), Duration::from_millis(20));
//! assert_eq!(backoff.delay(4), Duration::from_millis(80));
//! ```

use std::{ops::Range, time::Duration};

use crate::{
    config::PollConfig,
    policies::{jitter, strategy::BackoffStrategy},
};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Resolved backoff parameters for one session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Active delay formula.
    pub strategy: BackoffStrategy,
    /// Base of the exponential ramp (delay after the first failure).
    pub exponential_unit: Duration,
    /// Window for the random strategy.
    pub random_range: Range<Duration>,
    /// Delay for the consecutive strategy and the unrecognized fallback.
    pub constant: Duration,
}

impl BackoffPolicy {
    /// Resolves the policy from a session configuration.
    ///
    /// `constant` is `constant_time` when set, otherwise the poll interval.
    pub fn from_config(cfg: &PollConfig) -> Self {
        Self {
            strategy: cfg.backoff_strategy.clone(),
            exponential_unit: cfg.exponential_unit,
            random_range: cfg.random_range.clone(),
            constant: cfg.constant_delay(),
        }
    }

    /// Computes the delay after the `consecutive`-th failure in a row.
    ///
    /// `consecutive` is 1 for the first failure since the last success.
    /// A value of `0` is treated as `1`.
    pub fn delay(&self, consecutive: u32) -> Duration {
        match &self.strategy {
            BackoffStrategy::Exponential => self.exponential(consecutive),
            BackoffStrategy::Random => jitter::uniform(&self.random_range),
            BackoffStrategy::Consecutive | BackoffStrategy::Unrecognized(_) => self.constant,
        }
    }

    /// Exact `2^(n-1) × unit`, computed in nanoseconds.
    ///
    /// Only results that no `Duration` can hold collapse to `Duration::MAX`.
    fn exponential(&self, consecutive: u32) -> Duration {
        let exp = consecutive.max(1) - 1;
        if exp >= u128::BITS {
            return Duration::MAX;
        }
        let Some(nanos) = self.exponential_unit.as_nanos().checked_mul(1u128 << exp) else {
            return Duration::MAX;
        };
        match u64::try_from(nanos / NANOS_PER_SEC) {
            Ok(secs) => Duration::new(secs, (nanos % NANOS_PER_SEC) as u32),
            Err(_) => Duration::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn policy(strategy: BackoffStrategy) -> BackoffPolicy {
        BackoffPolicy {
            strategy,
            exponential_unit: Duration::from_millis(1000),
            random_range: Duration::from_millis(1000)..Duration::from_millis(10_000),
            constant: Duration::from_millis(500),
        }
    }

    #[test]
    fn test_exponential_starts_at_unit() {
        let p = policy(BackoffStrategy::Exponential);
        assert_eq!(p.delay(1), Duration::from_millis(1000));
    }

    #[test]
    fn test_exponential_growth() {
        let p = policy(BackoffStrategy::Exponential);
        let expected = [1000, 2000, 4000, 8000, 16_000, 32_000, 64_000, 128_000, 256_000];
        for (i, ms) in expected.iter().enumerate() {
            let n = i as u32 + 1;
            assert_eq!(p.delay(n), Duration::from_millis(*ms), "n={n}");
        }
    }

    #[test]
    fn test_exponential_zero_treated_as_first() {
        let p = policy(BackoffStrategy::Exponential);
        assert_eq!(p.delay(0), p.delay(1));
    }

    #[test]
    fn test_exponential_past_u32_factor() {
        let p = BackoffPolicy {
            exponential_unit: Duration::from_millis(1),
            ..policy(BackoffStrategy::Exponential)
        };
        assert_eq!(p.delay(32), Duration::from_millis(2_147_483_648));
        assert_eq!(p.delay(33), Duration::from_millis(4_294_967_296));
        assert_eq!(p.delay(34), Duration::from_millis(8_589_934_592));
    }

    #[test]
    fn test_exponential_saturates() {
        let p = policy(BackoffStrategy::Exponential);
        assert_eq!(p.delay(40), Duration::from_secs(1 << 39));
        assert_eq!(p.delay(64), Duration::from_secs(1 << 63));
        assert_eq!(p.delay(65), Duration::MAX);
        assert_eq!(p.delay(129), Duration::MAX);
        assert_eq!(p.delay(u32::MAX), Duration::MAX);
    }

    #[test]
    fn test_random_bounds() {
        let p = policy(BackoffStrategy::Random);
        for n in 1..200 {
            let d = p.delay(n);
            assert!(d >= Duration::from_millis(1000), "n={n}: {d:?} below range");
            assert!(d < Duration::from_millis(10_000), "n={n}: {d:?} above range");
        }
    }

    #[test]
    fn test_consecutive_is_constant() {
        let p = policy(BackoffStrategy::Consecutive);
        for n in 1..20 {
            assert_eq!(
                p.delay(n),
                Duration::from_millis(500),
                "n={n} should be constant at 500ms"
            );
        }
    }

    #[test]
    fn test_unrecognized_behaves_as_consecutive() {
        let p = policy(BackoffStrategy::Unrecognized(Arc::from("fibonacci")));
        assert_eq!(p.delay(1), Duration::from_millis(500));
        assert_eq!(p.delay(7), Duration::from_millis(500));
    }

    #[test]
    fn test_from_config_constant_defaults_to_interval() {
        let cfg = PollConfig::new(Duration::from_millis(2000))
            .with_strategy(BackoffStrategy::Consecutive);
        assert_eq!(
            BackoffPolicy::from_config(&cfg).delay(3),
            Duration::from_millis(2000)
        );

        let cfg = cfg.with_constant_time(Duration::from_millis(750));
        assert_eq!(
            BackoffPolicy::from_config(&cfg).delay(3),
            Duration::from_millis(750)
        );
    }
}
