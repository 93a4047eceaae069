use std::time::Duration;

/// Longest block, window or session lifetime accepted. Keeps `Instant + Duration`
/// from overflowing.
pub const MAX_DURATION: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LimitsError {
    #[error("max attempts must be greater than zero")]
    ZeroMaxAttempts,
    #[error("block duration must be greater than zero")]
    ZeroBlockDuration,
    #[error("window duration must be greater than zero")]
    ZeroWindowDuration,
    #[error("{0} exceeds the maximum of {max} seconds", max = MAX_DURATION.as_secs())]
    DurationTooLong(&'static str),
}

/// Thresholds for the login tracker. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterConfig {
    max_attempts: u32,
    block_duration: Duration,
    window_duration: Duration,
}

impl RateLimiterConfig {
    pub fn new(
        max_attempts: u32,
        block_duration: Duration,
        window_duration: Duration,
    ) -> Result<Self, LimitsError> {
        if max_attempts == 0 {
            return Err(LimitsError::ZeroMaxAttempts);
        }
        if block_duration.is_zero() {
            return Err(LimitsError::ZeroBlockDuration);
        }
        if window_duration.is_zero() {
            return Err(LimitsError::ZeroWindowDuration);
        }
        if block_duration > MAX_DURATION {
            return Err(LimitsError::DurationTooLong("block duration"));
        }
        if window_duration > MAX_DURATION {
            return Err(LimitsError::DurationTooLong("window duration"));
        }

        Ok(RateLimiterConfig {
            max_attempts,
            block_duration,
            window_duration,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn block_duration(&self) -> Duration {
        self.block_duration
    }

    pub fn window_duration(&self) -> Duration {
        self.window_duration
    }
}
