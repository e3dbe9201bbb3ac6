//! # Backoff strategy selector.
//!
//! [`BackoffStrategy`] names the delay formula used between a failed invocation
//! and the next one:
//!
//! - [`BackoffStrategy::Exponential`]: `2^(n-1) × exponential_unit` (default)
//! - [`BackoffStrategy::Random`]: uniform draw from `random_range`
//! - [`BackoffStrategy::Consecutive`]: fixed `constant_time` (or the poll interval)
//!
//! Strategies often arrive as strings (CLI flags, config files, form inputs).
//! [`FromStr`] is strict; [`BackoffStrategy::parse_lenient`] keeps unknown
//! names as [`BackoffStrategy::Unrecognized`] so the session can still run with
//! the constant delay and report the bad value.
//!
//! # Example
//! ```rust
//! use pollvisor::BackoffStrategy;
//!
//! let s: BackoffStrategy = "random".parse().unwrap();
//! assert_eq!(s, BackoffStrategy::Random);
//!
//! let fallback = BackoffStrategy::parse_lenient("fibonacci");
//! assert!(fallback.is_unrecognized());
//! assert_eq!(fallback.as_str(), "fibonacci");
//! ```

use std::{fmt, str::FromStr, sync::Arc};

use crate::error::ConfigError;

/// Delay formula applied after a failed invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackoffStrategy {
    /// Doubles the delay on every consecutive failure, starting at one unit.
    #[default]
    Exponential,
    /// Picks a uniformly random delay in the configured range.
    Random,
    /// Waits the same amount of time after every failure.
    Consecutive,
    /// A name no strategy answers to.
    ///
    /// Delays like [`BackoffStrategy::Consecutive`]; every delay computation
    /// emits a warning naming the value.
    Unrecognized(Arc<str>),
}

impl BackoffStrategy {
    /// Parses a strategy name, keeping unknown names instead of failing.
    ///
    /// Matching is ASCII case-insensitive and ignores surrounding whitespace.
    pub fn parse_lenient(name: &str) -> Self {
        name.parse()
            .unwrap_or_else(|_| BackoffStrategy::Unrecognized(Arc::from(name)))
    }

    /// Canonical name (or the original text for [`BackoffStrategy::Unrecognized`]).
    pub fn as_str(&self) -> &str {
        match self {
            BackoffStrategy::Exponential => "exponential",
            BackoffStrategy::Random => "random",
            BackoffStrategy::Consecutive => "consecutive",
            BackoffStrategy::Unrecognized(name) => name,
        }
    }

    /// True for [`BackoffStrategy::Unrecognized`].
    #[inline]
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, BackoffStrategy::Unrecognized(_))
    }
}

impl FromStr for BackoffStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("exponential") {
            Ok(BackoffStrategy::Exponential)
        } else if trimmed.eq_ignore_ascii_case("random") {
            Ok(BackoffStrategy::Random)
        } else if trimmed.eq_ignore_ascii_case("consecutive") {
            Ok(BackoffStrategy::Consecutive)
        } else {
            Err(ConfigError::UnknownStrategy { name: s.to_string() })
        }
    }
}

impl fmt::Display for BackoffStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
