//! Courtesy delays between successive page fetches.
//!
//! The pagination walker pauses between requests so a multi-page walk does
//! not hammer the origin server. The pause length comes from a pluggable
//! [`CourtesyDelay`] strategy rather than an inline sleep, so tests (and any
//! future smarter backoff) can swap it out.

use std::time::Duration;

use rand::Rng;

/// Default lower bound for the randomized delay (400ms).
const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(400);

/// Default upper bound for the randomized delay (5 seconds).
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);

/// Strategy deciding how long to pause before a page fetch.
pub trait CourtesyDelay: Send + Sync {
    /// Returns the pause before fetching the given attempt.
    ///
    /// `attempt` counts from 1 and covers both page iterations and retries
    /// of a failing page; strategies may ignore it.
    fn wait(&self, attempt: u32) -> Duration;
}

/// Uniformly random delay within a configured range.
///
/// Randomizing the spacing keeps a long walk from producing a perfectly
/// regular request pattern.
#[derive(Debug, Clone)]
pub struct RandomizedDelay {
    min: Duration,
    max: Duration,
}

impl RandomizedDelay {
    /// Creates a randomized delay within `[min, max]`.
    ///
    /// The bounds are swapped if given in the wrong order.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }
}

impl Default for RandomizedDelay {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DELAY, DEFAULT_MAX_DELAY)
    }
}

impl CourtesyDelay for RandomizedDelay {
    #[allow(clippy::cast_possible_truncation)]
    fn wait(&self, _attempt: u32) -> Duration {
        let min_ms = self.min.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;
        if min_ms == max_ms {
            return self.min;
        }
        let ms = rand::thread_rng().gen_range(min_ms..=max_ms);
        Duration::from_millis(ms)
    }
}

/// No delay at all. For tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

impl CourtesyDelay for NoDelay {
    fn wait(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }
}
