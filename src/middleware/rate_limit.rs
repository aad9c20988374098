//! Sliding-window rate limiting
//!
//! Tracks per-user attempt timestamps in a process-local map. Used by the
//! membership gate to bound how often a user can trigger channel-membership
//! lookups.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

#[derive(Debug, Clone)]
pub struct SlidingWindowLimiter {
    max_attempts: u32,
    window: Duration,
    attempts: Arc<Mutex<HashMap<i64, Vec<Instant>>>>,
}

impl SlidingWindowLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            attempts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Check the user against the window. Attempts inside the limit are
    /// recorded; an over-limit check is rejected without being recorded,
    /// so the window drains naturally.
    pub fn is_limited(&self, user_id: i64) -> bool {
        let now = Instant::now();
        let mut attempts = self.attempts.lock().unwrap();
        let entry = attempts.entry(user_id).or_default();

        entry.retain(|at| now.duration_since(*at) < self.window);

        if entry.len() >= self.max_attempts as usize {
            debug!(user_id, attempts = entry.len(), "Rate limit hit");
            return true;
        }

        entry.push(now);
        false
    }

    /// Drop users whose every attempt has aged out (periodic hygiene).
    pub fn cleanup(&self) {
        let now = Instant::now();
        let mut attempts = self.attempts.lock().unwrap();
        attempts.retain(|_, entry| {
            entry.retain(|at| now.duration_since(*at) < self.window);
            !entry.is_empty()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_applies_per_user() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(600));

        assert!(!limiter.is_limited(1));
        assert!(!limiter.is_limited(1));
        assert!(limiter.is_limited(1));

        // a different user has their own window
        assert!(!limiter.is_limited(2));
    }

    #[test]
    fn test_window_expiry() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_millis(10));
        assert!(!limiter.is_limited(1));
        assert!(limiter.is_limited(1));

        std::thread::sleep(Duration::from_millis(20));
        assert!(!limiter.is_limited(1));
    }

    #[test]
    fn test_cleanup_drops_stale_users() {
        let limiter = SlidingWindowLimiter::new(5, Duration::from_millis(10));
        assert!(!limiter.is_limited(1));
        std::thread::sleep(Duration::from_millis(20));
        limiter.cleanup();
        assert!(limiter.attempts.lock().unwrap().is_empty());
    }
}
