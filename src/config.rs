//! # Polling session configuration.
//!
//! Provides [`PollConfig`], the immutable settings of one polling session.
//!
//! Only `interval` is required; everything else has a default:
//!
//! | field              | default            |
//! |--------------------|--------------------|
//! | `attempts`         | 9                  |
//! | `backoff_strategy` | `Exponential`      |
//! | `exponential_unit` | 1s                 |
//! | `random_range`     | 1s..10s            |
//! | `constant_time`    | `None` → `interval` |
//!
//! ## Sentinel values
//! - `attempts = 0` → the first failure ends the session.
//! - `constant_time = None` → consecutive backoff waits one poll interval.

use std::{ops::Range, time::Duration};

use crate::{error::ConfigError, policies::BackoffStrategy};

/// Default retry budget.
pub const DEFAULT_ATTEMPTS: u32 = 9;
/// Default base of the exponential ramp.
pub const DEFAULT_EXPONENTIAL_UNIT: Duration = Duration::from_millis(1000);
/// Default lower bound of the random window.
pub const DEFAULT_RANDOM_MIN: Duration = Duration::from_millis(1000);
/// Default upper bound (exclusive) of the random window.
pub const DEFAULT_RANDOM_MAX: Duration = Duration::from_millis(10_000);

/// Settings of one polling session.
///
/// Built once with [`PollConfig::new`] and the `with_*` helpers, then handed
/// to [`poll`](crate::poll) or [`Poller`](crate::Poller). The engine never
/// mutates it.
///
/// ## Field semantics
/// - `interval`: period between ticks while the host is visible.
/// - `attempts`: consecutive failures tolerated; failure number `attempts + 1` is terminal.
/// - `backoff_strategy`: which formula computes the retry delay.
/// - `exponential_unit`: delay after the first failure under `Exponential`.
/// - `random_range`: half-open window for `Random`.
/// - `constant_time`: delay for `Consecutive` (and the unrecognized fallback).
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use pollvisor::{BackoffStrategy, PollConfig};
///
/// let cfg = PollConfig::new(Duration::from_secs(2))
///     .with_attempts(4)
///     .with_strategy(BackoffStrategy::Consecutive);
///
/// assert!(cfg.validate().is_ok());
/// assert_eq!(cfg.constant_delay(), Duration::from_secs(2));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollConfig {
    /// Period of the poll loop.
    pub interval: Duration,
    /// Consecutive failures retried before the session fails.
    pub attempts: u32,
    /// Delay formula applied after a failure.
    pub backoff_strategy: BackoffStrategy,
    /// Unit of the exponential ramp.
    pub exponential_unit: Duration,
    /// Window of the random strategy, `[start, end)`.
    pub random_range: Range<Duration>,
    /// Fixed delay of the consecutive strategy; `None` means `interval`.
    pub constant_time: Option<Duration>,
}

impl PollConfig {
    /// Creates a configuration with the given interval and defaults elsewhere.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            attempts: DEFAULT_ATTEMPTS,
            backoff_strategy: BackoffStrategy::default(),
            exponential_unit: DEFAULT_EXPONENTIAL_UNIT,
            random_range: DEFAULT_RANDOM_MIN..DEFAULT_RANDOM_MAX,
            constant_time: None,
        }
    }

    /// Returns a new config with updated retry budget.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Returns a new config with updated backoff strategy.
    pub fn with_strategy(mut self, strategy: BackoffStrategy) -> Self {
        self.backoff_strategy = strategy;
        self
    }

    /// Returns a new config with the strategy parsed leniently from `name`.
    ///
    /// Unknown names are kept as [`BackoffStrategy::Unrecognized`].
    pub fn with_strategy_name(self, name: &str) -> Self {
        self.with_strategy(BackoffStrategy::parse_lenient(name))
    }

    /// Returns a new config with updated exponential unit.
    pub fn with_exponential_unit(mut self, unit: Duration) -> Self {
        self.exponential_unit = unit;
        self
    }

    /// Returns a new config with updated random window.
    pub fn with_random_range(mut self, range: Range<Duration>) -> Self {
        self.random_range = range;
        self
    }

    /// Returns a new config with updated constant delay.
    pub fn with_constant_time(mut self, constant: Duration) -> Self {
        self.constant_time = Some(constant);
        self
    }

    /// Delay used by the consecutive strategy.
    #[inline]
    pub fn constant_delay(&self) -> Duration {
        self.constant_time.unwrap_or(self.interval)
    }

    /// Checks the invariants the engine relies on.
    ///
    /// Only the parameters of the **active** strategy are checked, so a
    /// session on `Exponential` does not care about its random window.
    /// [`BackoffStrategy::Unrecognized`] passes; it is reported at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        match self.backoff_strategy {
            BackoffStrategy::Exponential if self.exponential_unit.is_zero() => {
                Err(ConfigError::ZeroExponentialUnit)
            }
            BackoffStrategy::Random if self.random_range.is_empty() => {
                Err(ConfigError::EmptyRandomRange {
                    start: self.random_range.start,
                    end: self.random_range.end,
                })
            }
            BackoffStrategy::Consecutive | BackoffStrategy::Unrecognized(_)
                if self.constant_time.is_some_and(|d| d.is_zero()) =>
            {
                Err(ConfigError::ZeroConstantTime)
            }
            _ => Ok(()),
        }
    }
}
