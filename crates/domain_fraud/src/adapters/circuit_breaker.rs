//! Circuit breaker for remote adapters
//!
//! Opens after `failure_threshold` consecutive failures, lets a probe
//! through once `reset_timeout_secs` has passed, and closes again after
//! `success_threshold` consecutive successes.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use tokio::sync::RwLock;
use tracing::warn;

use core_kernel::CircuitBreakerConfig;

#[derive(Debug)]
pub struct CircuitBreaker {
    name: &'static str,
    config: CircuitBreakerConfig,
    failure_count: AtomicU64,
    success_count: AtomicU64,
    is_open: AtomicBool,
    opened_at: RwLock<Option<Instant>>,
}

impl CircuitBreaker {
    pub fn new(name: &'static str, config: CircuitBreakerConfig) -> Self {
        Self {
            name,
            config,
            failure_count: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            is_open: AtomicBool::new(false),
            opened_at: RwLock::new(None),
        }
    }

    /// True when a call may go through (closed, or half-open after the reset timeout)
    pub async fn is_available(&self) -> bool {
        if !self.is_open.load(Ordering::Relaxed) {
            return true;
        }
        match *self.opened_at.read().await {
            Some(at) => at.elapsed() > self.config.reset_timeout(),
            None => false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open.load(Ordering::Relaxed)
    }

    pub fn record_success(&self) {
        self.failure_count.store(0, Ordering::Relaxed);
        if !self.is_open.load(Ordering::Relaxed) {
            return;
        }
        let successes = self.success_count.fetch_add(1, Ordering::Relaxed) + 1;
        if successes >= self.config.success_threshold as u64 {
            self.is_open.store(false, Ordering::Relaxed);
            self.success_count.store(0, Ordering::Relaxed);
        }
    }

    pub async fn record_failure(&self) {
        self.success_count.store(0, Ordering::Relaxed);
        let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= self.config.failure_threshold as u64 {
            if !self.is_open.swap(true, Ordering::Relaxed) {
                warn!(breaker = self.name, failures, "Circuit opened");
            }
            *self.opened_at.write().await = Some(Instant::now());
        }
    }
}
