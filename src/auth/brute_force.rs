use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::auth::limits::RateLimiterConfig;

/// Failure history for a single lockout key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginAttempt {
    pub count: u32,
    pub first_attempt: Instant,
    pub last_attempt: Instant,
    pub blocked: bool,
    /// Set exactly when `blocked` is true.
    pub block_expires: Option<Instant>,
}

impl LoginAttempt {
    fn new(now: Instant) -> Self {
        LoginAttempt {
            count: 0,
            first_attempt: now,
            last_attempt: now,
            blocked: false,
            block_expires: None,
        }
    }

    fn active_lockout(&self, now: Instant) -> Option<Instant> {
        match self.block_expires {
            Some(expires) if self.blocked && now < expires => Some(expires),
            _ => None,
        }
    }

    fn lockout_elapsed(&self, now: Instant) -> bool {
        self.blocked && self.block_expires.is_some_and(|expires| now >= expires)
    }

    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        if self.blocked {
            self.lockout_elapsed(now)
        } else {
            now.saturating_duration_since(self.last_attempt) > window
        }
    }
}

/// Result of reporting a failed sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Still under the threshold.
    Counted { remaining: u32 },
    /// This failure reached the threshold and started a lockout.
    Blocked { expires: Instant },
    /// A lockout was already running; nothing was counted.
    AlreadyBlocked { expires: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Clear,
    Blocked { remaining: Duration },
}

/// Counts failed sign-ins per key and locks a key out once it reaches
/// `max_attempts` failures inside one window.
///
/// Window and lockout expiry are evaluated lazily when a key is touched.
/// `sweep` evicts records that nobody comes back for.
pub struct LoginTracker {
    attempts: DashMap<String, LoginAttempt>,
    config: RateLimiterConfig,
}

impl LoginTracker {
    pub fn new(config: RateLimiterConfig) -> Self {
        LoginTracker {
            attempts: DashMap::new(),
            config,
        }
    }

    pub fn is_blocked(&self, key: &str, now: Instant) -> BlockState {
        if self
            .attempts
            .remove_if(key, |_, attempt| attempt.lockout_elapsed(now))
            .is_some()
        {
            tracing::debug!(key, "Lockout expired");
            return BlockState::Clear;
        }

        self.attempts
            .get(key)
            .and_then(|attempt| attempt.active_lockout(now))
            .map(|expires| BlockState::Blocked {
                remaining: expires - now,
            })
            .unwrap_or(BlockState::Clear)
    }

    pub fn record_failure(&self, key: &str, now: Instant) -> FailureOutcome {
        let mut entry = self
            .attempts
            .entry(key.to_string())
            .or_insert_with(|| LoginAttempt::new(now));
        let attempt = entry.value_mut();

        if let Some(expires) = attempt.active_lockout(now) {
            attempt.last_attempt = now;
            return FailureOutcome::AlreadyBlocked { expires };
        }

        // Expired lockout or expired window: start over
        let restart = attempt.blocked
            || now.saturating_duration_since(attempt.first_attempt) > self.config.window_duration();
        let count = if restart { 1 } else { attempt.count + 1 };
        // Worked out before the record is touched, so the update is all or nothing
        let expires = (count >= self.config.max_attempts())
            .then(|| now + self.config.block_duration());

        if restart {
            *attempt = LoginAttempt::new(now);
        }
        attempt.count = count;
        attempt.last_attempt = now;
        attempt.blocked = expires.is_some();
        attempt.block_expires = expires;
        drop(entry);

        match expires {
            Some(expires) => {
                tracing::warn!(
                    key,
                    block_secs = self.config.block_duration().as_secs(),
                    "Lockout triggered after {} failed attempts",
                    self.config.max_attempts()
                );
                FailureOutcome::Blocked { expires }
            }
            None => FailureOutcome::Counted {
                remaining: self.config.max_attempts() - count,
            },
        }
    }

    pub fn record_success(&self, key: &str) {
        self.attempts.remove(key);
    }

    /// Drops records whose window lapsed without a lockout, and records whose
    /// lockout has run out. Returns how many were evicted.
    pub fn sweep(&self, now: Instant) -> usize {
        let window = self.config.window_duration();
        let mut evicted = 0;
        self.attempts.retain(|_, attempt| {
            let stale = attempt.is_stale(now, window);
            if stale {
                evicted += 1;
            }
            !stale
        });
        evicted
    }

    #[cfg(test)]
    pub fn attempt(&self, key: &str) -> Option<LoginAttempt> {
        self.attempts.get(key).map(|attempt| attempt.value().clone())
    }

    pub fn tracked_keys(&self) -> usize {
        self.attempts.len()
    }
}
