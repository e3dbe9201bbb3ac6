//! Error types used by the polling engine.
//!
//! This module defines two enums:
//!
//! - [`PollError`]: the terminal error of a polling session.
//! - [`ConfigError`]: rejected session configuration.
//!
//! Both provide `as_label` for logs/metrics. Transient source failures never
//! appear here: they are absorbed by the recovery loop until the retry budget
//! runs out.

use std::{any::Any, time::Duration};
use thiserror::Error;

/// # Terminal error of a polling session.
///
/// Delivered at most once, as the last item of a [`PollSession`](crate::PollSession).
/// `Exhausted` carries the **original** error returned by the source on the
/// failing attempt.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PollError<E> {
    /// The source failed more times in a row than `attempts` allows.
    #[error("retries exhausted after {failures} consecutive failures: {error}")]
    Exhausted {
        /// Consecutive failures observed, including the final one (`attempts + 1`).
        failures: u32,
        /// The error returned by the last invocation.
        error: E,
    },

    /// The session driver panicked, e.g. inside the [`Scheduler`](crate::Scheduler)
    /// or while polling the source future.
    #[error("polling session aborted: {reason}")]
    Aborted {
        /// Panic message.
        reason: String,
    },
}

impl<E> PollError<E> {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pollvisor::PollError;
    ///
    /// let err = PollError::Exhausted { failures: 10, error: "boom" };
    /// assert_eq!(err.as_label(), "poll_exhausted");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PollError::Exhausted { .. } => "poll_exhausted",
            PollError::Aborted { .. } => "poll_aborted",
        }
    }

    /// Number of consecutive failures that ended the session, if it ran out of retries.
    pub fn failures(&self) -> Option<u32> {
        match self {
            PollError::Exhausted { failures, .. } => Some(*failures),
            PollError::Aborted { .. } => None,
        }
    }

    /// Borrows the source error, if the session ran out of retries.
    pub fn source_error(&self) -> Option<&E> {
        match self {
            PollError::Exhausted { error, .. } => Some(error),
            PollError::Aborted { .. } => None,
        }
    }

    /// Unwraps the source error, if the session ran out of retries.
    pub fn into_inner(self) -> Option<E> {
        match self {
            PollError::Exhausted { error, .. } => Some(error),
            PollError::Aborted { .. } => None,
        }
    }
}

/// Extracts a readable message from a caught panic payload.
pub(crate) fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// # Rejected session configuration.
///
/// Returned by [`PollConfig::validate`](crate::PollConfig::validate) and by
/// [`Poller::spawn`](crate::Poller::spawn) before any work starts.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Polling interval must be positive.
    #[error("poll interval must be greater than zero")]
    ZeroInterval,

    /// Exponential unit must be positive.
    #[error("exponential backoff unit must be greater than zero")]
    ZeroExponentialUnit,

    /// Constant backoff time, when set, must be positive.
    #[error("constant backoff time must be greater than zero")]
    ZeroConstantTime,

    /// Random backoff range must not be empty.
    #[error("random backoff range {start:?}..{end:?} is empty")]
    EmptyRandomRange {
        /// Inclusive lower bound.
        start: Duration,
        /// Exclusive upper bound.
        end: Duration,
    },

    /// Strategy name not recognized by the strict parser.
    #[error("unknown backoff strategy {name:?} (expected exponential, random or consecutive)")]
    UnknownStrategy {
        /// The rejected name.
        name: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pollvisor::ConfigError;
    ///
    /// assert_eq!(ConfigError::ZeroInterval.as_label(), "config_zero_interval");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ZeroInterval => "config_zero_interval",
            ConfigError::ZeroExponentialUnit => "config_zero_exponential_unit",
            ConfigError::ZeroConstantTime => "config_zero_constant_time",
            ConfigError::EmptyRandomRange { .. } => "config_empty_random_range",
            ConfigError::UnknownStrategy { .. } => "config_unknown_strategy",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_keeps_original_error() {
        let err = PollError::Exhausted {
            failures: 3,
            error: "connection refused".to_string(),
        };
        assert_eq!(err.failures(), Some(3));
        assert_eq!(err.source_error().map(String::as_str), Some("connection refused"));
        assert_eq!(
            err.to_string(),
            "retries exhausted after 3 consecutive failures: connection refused"
        );
        assert_eq!(err.into_inner().as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_aborted_has_no_source_error() {
        let err: PollError<String> = PollError::Aborted {
            reason: "timer backend down".to_string(),
        };
        assert_eq!(err.as_label(), "poll_aborted");
        assert_eq!(err.failures(), None);
        assert!(err.source_error().is_none());
        assert_eq!(err.to_string(), "polling session aborted: timer backend down");
    }

    #[test]
    fn test_panic_reason_downcasts() {
        let static_msg: Box<dyn Any + Send> = Box::new("static");
        let owned_msg: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_reason(&*static_msg), "static");
        assert_eq!(panic_reason(&*owned_msg), "owned");
        assert_eq!(panic_reason(&*other), "unknown panic");
    }

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::EmptyRandomRange {
            start: Duration::from_secs(2),
            end: Duration::from_secs(1),
        };
        assert_eq!(err.as_label(), "config_empty_random_range");
        assert_eq!(err.to_string(), "random backoff range 2s..1s is empty");
    }
}
