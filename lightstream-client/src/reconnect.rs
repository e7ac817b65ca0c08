//! Reconnection policy for the feed connection.
//!
//! Only attempts to reopen a lost connection are counted; the loss itself
//! is not an attempt. The first connect is never retried.

use lightstream_core::ConfigError;
use std::time::Duration;

/// Configuration for reconnection behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectConfig {
    /// Whether a lost connection is reopened.
    pub enabled: bool,
    /// Delay before the first reopen attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Growth factor applied to the delay after each attempt.
    pub backoff_multiplier: f64,
    /// Reopen attempts allowed per lost connection (0 = unlimited).
    pub max_attempts: usize,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            max_attempts: 10,
        }
    }
}

impl ReconnectConfig {
    /// Checks that the backoff schedule is well formed.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidReconnect` if the multiplier is not a
    /// finite number of at least 1.0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = self.backoff_multiplier;
        if !m.is_finite() || m < 1.0 {
            return Err(ConfigError::InvalidReconnect {
                message: format!("backoff multiplier must be finite and >= 1.0, got {m}"),
            });
        }
        Ok(())
    }
}

/// Backoff schedule for one lost connection.
#[derive(Debug)]
pub struct ReconnectState {
    config: ReconnectConfig,
    attempts: usize,
    next_delay: Duration,
}

impl ReconnectState {
    /// Creates a fresh schedule.
    #[must_use]
    pub fn new(config: ReconnectConfig) -> Self {
        let next_delay = config.initial_delay.min(config.max_delay);
        Self {
            config,
            attempts: 0,
            next_delay,
        }
    }

    /// Claims the next reopen attempt and returns the delay to wait first.
    ///
    /// Returns `None` when reconnection is disabled or the attempts for the
    /// current outage are used up.
    pub fn next_attempt(&mut self) -> Option<Duration> {
        if !self.config.enabled {
            return None;
        }
        if self.config.max_attempts > 0 && self.attempts >= self.config.max_attempts {
            return None;
        }

        self.attempts += 1;
        let delay = self.next_delay;

        let grown = delay.as_secs_f64() * self.config.backoff_multiplier;
        self.next_delay = Duration::try_from_secs_f64(grown)
            .unwrap_or(self.config.max_delay)
            .min(self.config.max_delay);

        Some(delay)
    }

    /// Restarts the schedule once a connection is back.
    pub fn on_success(&mut self) {
        self.attempts = 0;
        self.next_delay = self.config.initial_delay.min(self.config.max_delay);
    }

    /// Returns true if reconnection is enabled at all.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Returns the reopen attempts made for the current outage.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(max_attempts: usize) -> ReconnectConfig {
        ReconnectConfig {
            enabled: true,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            max_attempts,
        }
    }

    #[test]
    fn test_disabled_by_default() {
        let mut state = ReconnectState::new(ReconnectConfig::default());
        assert!(!state.enabled());
        assert!(state.next_attempt().is_none());
        assert_eq!(state.attempts(), 0);
    }

    #[test]
    fn test_backoff_doubles() {
        let mut state = ReconnectState::new(enabled(5));

        assert_eq!(state.next_attempt(), Some(Duration::from_millis(100)));
        assert_eq!(state.next_attempt(), Some(Duration::from_millis(200)));
        assert_eq!(state.next_attempt(), Some(Duration::from_millis(400)));
        assert_eq!(state.attempts(), 3);
    }

    #[test]
    fn test_backoff_capped_at_max_delay() {
        let config = ReconnectConfig {
            max_delay: Duration::from_millis(250),
            ..enabled(0)
        };
        let mut state = ReconnectState::new(config);

        state.next_attempt();
        state.next_attempt();
        assert_eq!(state.next_attempt(), Some(Duration::from_millis(250)));
        assert_eq!(state.next_attempt(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_max_attempts_counts_reopens_only() {
        let mut state = ReconnectState::new(enabled(2));

        assert!(state.next_attempt().is_some());
        assert!(state.next_attempt().is_some());
        assert!(state.next_attempt().is_none());
        assert_eq!(state.attempts(), 2);
    }

    #[test]
    fn test_single_attempt_allowed() {
        let mut state = ReconnectState::new(enabled(1));

        assert_eq!(state.next_attempt(), Some(Duration::from_millis(100)));
        assert!(state.next_attempt().is_none());
    }

    #[test]
    fn test_unlimited_attempts() {
        let mut state = ReconnectState::new(enabled(0));
        for _ in 0..100 {
            assert!(state.next_attempt().is_some());
        }
    }

    #[test]
    fn test_reset_after_success() {
        let mut state = ReconnectState::new(enabled(5));

        state.next_attempt();
        state.next_attempt();
        assert_eq!(state.attempts(), 2);

        state.on_success();
        assert_eq!(state.attempts(), 0);
        assert_eq!(state.next_attempt(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_overflowing_growth_saturates_at_max_delay() {
        let config = ReconnectConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: f64::MAX,
            ..enabled(0)
        };
        let mut state = ReconnectState::new(config);

        assert_eq!(state.next_attempt(), Some(Duration::from_secs(1)));
        assert_eq!(state.next_attempt(), Some(Duration::from_secs(60)));
        assert_eq!(state.next_attempt(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_validate_multiplier() {
        assert!(enabled(1).validate().is_ok());

        for bad in [-2.0, 0.5, f64::NAN, f64::INFINITY] {
            let config = ReconnectConfig {
                backoff_multiplier: bad,
                ..enabled(1)
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidReconnect { .. })
            ));
        }
    }
}
