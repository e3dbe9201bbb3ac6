//! # Uniform delay sampling for the random backoff strategy.
//!
//! Spreads retries of many clients over a window so they do not hit a
//! recovering backend in lockstep.
//!
//! - Lower bound is inclusive, upper bound exclusive: `[start, end)`.
//! - An empty range (`start >= end`) yields `start`.
//! - Resolution is one nanosecond; bounds beyond `u64::MAX` ns saturate.

use rand::Rng;
use std::{ops::Range, time::Duration};

/// Draws a delay uniformly from `range` using the thread-local RNG.
pub(crate) fn uniform(range: &Range<Duration>) -> Duration {
    uniform_with(&mut rand::rng(), range)
}

/// Draws a delay uniformly from `range` using the given RNG.
pub(crate) fn uniform_with<R: Rng + ?Sized>(rng: &mut R, range: &Range<Duration>) -> Duration {
    let start = saturating_nanos(range.start);
    let end = saturating_nanos(range.end);
    if start >= end {
        return range.start;
    }
    Duration::from_nanos(rng.random_range(start..end))
}

fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_stays_in_half_open_range() {
        let range = Duration::from_millis(1000)..Duration::from_millis(10_000);
        for _ in 0..500 {
            let d = uniform(&range);
            assert!(d >= range.start, "{d:?} below {:?}", range.start);
            assert!(d < range.end, "{d:?} not below {:?}", range.end);
        }
    }

    #[test]
    fn test_uniform_single_nanosecond_range() {
        let range = Duration::from_millis(5)..(Duration::from_millis(5) + Duration::from_nanos(1));
        assert_eq!(uniform(&range), Duration::from_millis(5));
    }

    #[test]
    fn test_empty_range_returns_start() {
        let range = Duration::from_secs(3)..Duration::from_secs(3);
        assert_eq!(uniform(&range), Duration::from_secs(3));

        #[allow(clippy::reversed_empty_ranges)]
        let reversed = Duration::from_secs(9)..Duration::from_secs(1);
        assert_eq!(uniform(&reversed), Duration::from_secs(9));
    }

    #[test]
    fn test_uniform_spreads_values() {
        let range = Duration::from_millis(0)..Duration::from_millis(1_000);
        let mut lo = Duration::MAX;
        let mut hi = Duration::ZERO;
        for _ in 0..1_000 {
            let d = uniform(&range);
            lo = lo.min(d);
            hi = hi.max(d);
        }
        assert!(lo < Duration::from_millis(250), "min {lo:?} suspiciously high");
        assert!(hi > Duration::from_millis(750), "max {hi:?} suspiciously low");
    }
}
