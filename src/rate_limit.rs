//! Client-side sliding-window rate limiting.
//!
//! DESIGN
//! ======
//! Call timestamps live in a `VecDeque<Instant>`. Entries at least one
//! window old are pruned before each check; a call is admitted while fewer
//! than `limit` entries remain. Rejected calls are not recorded, so they do
//! not extend the lockout.

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const DEFAULT_LIMIT: usize = 5;
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitError {
    #[error("Rate limit exceeded. Max {limit} calls per {window_ms}ms.")]
    Exceeded { limit: usize, window_ms: u128 },
}

/// Shared limiter; clones count against the same window.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    calls: Arc<Mutex<VecDeque<Instant>>>,
    limit: usize,
    window: Duration,
}

impl RateLimiter {
    #[must_use]
    pub fn new(limit: usize, window: Duration) -> Self {
        Self { calls: Arc::new(Mutex::new(VecDeque::with_capacity(limit))), limit, window }
    }

    /// Admit and record one call, or reject it.
    ///
    /// # Errors
    ///
    /// Returns `RateLimitError::Exceeded` when `limit` calls already fall
    /// inside the current window.
    pub fn check_and_record(&self) -> Result<(), RateLimitError> {
        self.check_and_record_at(Instant::now())
    }

    /// Internal: check + record with explicit timestamp (for testing).
    fn check_and_record_at(&self, now: Instant) -> Result<(), RateLimitError> {
        let mut calls = self.calls.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        prune_window(&mut calls, now, self.window);
        if calls.len() >= self.limit {
            return Err(RateLimitError::Exceeded { limit: self.limit, window_ms: self.window.as_millis() });
        }
        calls.push_back(now);
        Ok(())
    }

    /// Run `f` if the limiter admits it.
    ///
    /// # Errors
    ///
    /// Returns `RateLimitError::Exceeded` without invoking `f` when the
    /// window is full.
    pub async fn call<F, Fut, T>(&self, f: F) -> Result<T, RateLimitError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.check_and_record()?;
        Ok(f().await)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_WINDOW)
    }
}

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.saturating_duration_since(front) >= window {
            deque.pop_front();
        } else {
            break;
        }
    }
}
