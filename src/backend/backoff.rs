//! Transport-level retry with exponential backoff and jitter.
//!
//! [`BackoffConfig`] controls how transient HTTP errors (429, 5xx) from the
//! completion endpoint are retried with increasing delays. The user is
//! usually waiting on a generated list, so [`BackoffConfig::interactive`]
//! is the preset the configuration layer picks by default.

use std::time::Duration;

/// Configuration for transport-level retry with exponential backoff and jitter.
///
/// # Example
///
/// ```
/// use shopping_list::backend::BackoffConfig;
///
/// let none = BackoffConfig::none();
/// assert_eq!(none.max_retries, 0);
///
/// let standard = BackoffConfig::standard();
/// assert_eq!(standard.max_retries, 3);
/// ```
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Maximum number of transport retries.
    pub max_retries: u32,

    /// Delay before the first retry.
    pub initial_delay: Duration,

    /// Multiplier applied to the delay after each retry.
    pub multiplier: f64,

    /// Upper bound on a single delay.
    pub max_delay: Duration,

    pub jitter: JitterStrategy,

    /// HTTP status codes that trigger a retry.
    pub retryable_statuses: Vec<u16>,

    /// Use the provider's `Retry-After` header instead of the computed delay.
    pub respect_retry_after: bool,
}

/// Jitter strategy applied to the computed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JitterStrategy {
    /// Delay is exactly the calculated value.
    None,

    /// Random value in `[0, calculated_delay]`.
    Full,

    /// `calculated_delay/2 + random in [0, calculated_delay/2]`.
    Equal,
}

impl BackoffConfig {
    /// No transport retry.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::standard()
        }
    }

    /// 3 retries, 1s initial, 2x multiplier, 60s max, full jitter.
    pub fn standard() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(60),
            jitter: JitterStrategy::Full,
            retryable_statuses: vec![429, 500, 502, 503, 504],
            respect_retry_after: true,
        }
    }

    /// 2 retries, 500ms initial, 10s max. For a user waiting on the result.
    pub fn interactive() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
            multiplier: 1.5,
            max_delay: Duration::from_secs(10),
            jitter: JitterStrategy::Full,
            retryable_statuses: vec![429, 500, 502, 503, 504],
            respect_retry_after: true,
        }
    }

    /// Calculate the delay for attempt N (0-indexed).
    ///
    /// `initial_delay * multiplier^attempt`, capped at `max_delay`, then jittered.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.delay_with_rng(attempt, &mut fastrand::Rng::new())
    }

    /// [`delay_for_attempt`](Self::delay_for_attempt) drawing jitter from `rng`.
    pub fn delay_with_rng(&self, attempt: u32, rng: &mut fastrand::Rng) -> Duration {
        let capped = self.capped_secs(attempt);
        let jittered = match self.jitter {
            JitterStrategy::None => capped,
            JitterStrategy::Full => rng.f64() * capped,
            JitterStrategy::Equal => capped / 2.0 + rng.f64() * (capped / 2.0),
        };
        Duration::from_secs_f64(jittered)
    }

    /// Longest total sleep a fully failing call can incur, ignoring `Retry-After`.
    pub fn worst_case_wait(&self) -> Duration {
        let secs: f64 = (0..self.max_retries).map(|a| self.capped_secs(a)).sum();
        Duration::from_secs_f64(secs)
    }

    fn capped_secs(&self, attempt: u32) -> f64 {
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        base.min(self.max_delay.as_secs_f64())
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter() -> BackoffConfig {
        BackoffConfig {
            max_retries: 5,
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(5),
            jitter: JitterStrategy::None,
            retryable_statuses: vec![429],
            respect_retry_after: false,
        }
    }

    #[test]
    fn test_delay_grows_then_caps() {
        let config = no_jitter();
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(4));
        assert_eq!(config.delay_for_attempt(3), Duration::from_secs(5));
        assert_eq!(config.delay_for_attempt(10), Duration::from_secs(5));
    }

    #[test]
    fn test_full_jitter_stays_under_cap() {
        let config = BackoffConfig {
            jitter: JitterStrategy::Full,
            ..no_jitter()
        };
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..100 {
            assert!(config.delay_with_rng(1, &mut rng) <= Duration::from_secs(2));
        }
    }

    #[test]
    fn test_equal_jitter_keeps_lower_half() {
        let config = BackoffConfig {
            jitter: JitterStrategy::Equal,
            ..no_jitter()
        };
        let mut rng = fastrand::Rng::with_seed(11);
        for _ in 0..100 {
            let d = config.delay_with_rng(1, &mut rng);
            assert!(d >= Duration::from_secs(1) && d <= Duration::from_secs(2), "{:?}", d);
        }
    }

    #[test]
    fn test_seeded_jitter_is_reproducible() {
        let config = BackoffConfig::standard();
        let a = config.delay_with_rng(2, &mut fastrand::Rng::with_seed(3));
        let b = config.delay_with_rng(2, &mut fastrand::Rng::with_seed(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_worst_case_wait() {
        // 1 + 2 + 4 + 5 + 5
        assert_eq!(no_jitter().worst_case_wait(), Duration::from_secs(17));
        assert_eq!(BackoffConfig::none().worst_case_wait(), Duration::ZERO);
    }

    #[test]
    fn test_presets() {
        assert_eq!(BackoffConfig::default().max_retries, 0);
        let interactive = BackoffConfig::interactive();
        assert_eq!(interactive.max_retries, 2);
        assert_eq!(interactive.max_delay, Duration::from_secs(10));
        assert!(interactive.retryable_statuses.contains(&429));
    }
}
