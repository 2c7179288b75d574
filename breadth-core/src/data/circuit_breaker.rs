//! Circuit breaker shared by all fetch workers.
//!
//! The constituent download fans out across a thread pool. When the
//! provider answers 403 (blocked) or keeps answering 429 (rate limit), the
//! breaker opens and every worker stops hitting the network until the
//! cooldown expires. Tickers refused while open are reported as failed.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Inner {
    tripped_at: Option<Instant>,
    consecutive_failures: u32,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                tripped_at: None,
                consecutive_failures: 0,
            }),
            cooldown,
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// 30-minute cooldown, opens after 5 consecutive failures.
    pub fn default_provider() -> Self {
        Self::new(Duration::from_secs(30 * 60), 5)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether requests may be sent. Closes the breaker again once the
    /// cooldown has elapsed.
    pub fn is_allowed(&self) -> bool {
        let mut inner = self.lock();
        match inner.tripped_at {
            None => true,
            Some(at) if at.elapsed() >= self.cooldown => {
                inner.tripped_at = None;
                inner.consecutive_failures = 0;
                true
            }
            Some(_) => false,
        }
    }

    pub fn record_success(&self) {
        self.lock().consecutive_failures = 0;
    }

    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures += 1;
        if inner.consecutive_failures >= self.failure_threshold && inner.tripped_at.is_none() {
            tracing::warn!(
                "circuit breaker open after {} consecutive failures",
                inner.consecutive_failures
            );
            inner.tripped_at = Some(Instant::now());
        }
    }

    /// Open immediately (403 Forbidden / IP ban).
    pub fn trip(&self) {
        let mut inner = self.lock();
        if inner.tripped_at.is_none() {
            tracing::warn!("circuit breaker tripped by provider block");
        }
        inner.tripped_at = Some(Instant::now());
    }

    /// Remaining cooldown (zero when closed).
    pub fn remaining_cooldown(&self) -> Duration {
        match self.lock().tripped_at {
            None => Duration::ZERO,
            Some(at) => self.cooldown.saturating_sub(at.elapsed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let cb = CircuitBreaker::new(Duration::from_secs(60), 3);
        assert!(cb.is_allowed());
        assert_eq!(cb.remaining_cooldown(), Duration::ZERO);
    }

    #[test]
    fn opens_after_threshold_failures() {
        let cb = CircuitBreaker::new(Duration::from_secs(60), 3);
        cb.record_failure();
        cb.record_failure();
        assert!(cb.is_allowed());
        cb.record_failure();
        assert!(!cb.is_allowed());
        assert!(cb.remaining_cooldown() > Duration::ZERO);
    }

    #[test]
    fn trip_opens_immediately() {
        let cb = CircuitBreaker::new(Duration::from_secs(60), 3);
        cb.trip();
        assert!(!cb.is_allowed());
    }

    #[test]
    fn success_resets_counter() {
        let cb = CircuitBreaker::new(Duration::from_secs(60), 3);
        cb.record_failure();
        cb.record_failure();
        cb.record_success();
        cb.record_failure();
        assert!(cb.is_allowed());
    }

    #[test]
    fn closes_after_cooldown() {
        let cb = CircuitBreaker::new(Duration::from_millis(10), 1);
        cb.record_failure();
        assert!(!cb.is_allowed());
        std::thread::sleep(Duration::from_millis(15));
        assert!(cb.is_allowed());
    }

    #[test]
    fn shared_across_threads() {
        let cb = std::sync::Arc::new(CircuitBreaker::new(Duration::from_secs(60), 4));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cb = cb.clone();
                std::thread::spawn(move || cb.record_failure())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(!cb.is_allowed());
    }
}
