//! Per-address token bucket admission control.
//!
//! Every remote address gets a bucket of `burst` tokens that refills
//! continuously at one token per `refill_every`. A request spends one token;
//! an empty bucket rejects the request before routing. Addresses not seen for
//! `idle_timeout` are dropped by a periodic sweep.
//!
//! Bucket contents are kept in nanoseconds of refill time (one token is
//! `refill_every` worth) so partial refills add up exactly.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::config::RateLimitConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Key used when the peer address is unknown (e.g. in-process test requests).
pub const UNKNOWN_VISITOR: &str = "unknown";

#[derive(Debug, Clone, Copy)]
struct Visitor {
    /// Refill time banked, capped at `burst * refill_every`.
    banked_nanos: u128,
    last_refill: Instant,
    last_seen: Instant,
}

/// Token buckets keyed by remote address.
pub struct RateLimiter {
    config: RateLimitConfig,
    visitors: Mutex<HashMap<String, Visitor>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            visitors: Mutex::new(HashMap::new()),
        }
    }

    /// Spend one token for `key`. Returns `false` when the bucket is empty.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    /// [`check`](Self::check) against an explicit clock reading.
    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let token = self.config.refill_every.as_nanos();
        let capacity = token * u128::from(self.config.burst);
        let mut visitors = self.lock();

        let visitor = visitors.entry(key.to_string()).or_insert(Visitor {
            banked_nanos: capacity,
            last_refill: now,
            last_seen: now,
        });

        let elapsed = now.saturating_duration_since(visitor.last_refill).as_nanos();
        visitor.banked_nanos = (visitor.banked_nanos + elapsed).min(capacity);
        visitor.last_refill = now;
        visitor.last_seen = now;

        if visitor.banked_nanos >= token {
            visitor.banked_nanos -= token;
            true
        } else {
            false
        }
    }

    /// Forget visitors idle for longer than the configured timeout.
    /// Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// [`sweep`](Self::sweep) against an explicit clock reading.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut visitors = self.lock();
        let before = visitors.len();
        visitors.retain(|_, v| now.saturating_duration_since(v.last_seen) <= self.config.idle_timeout);
        before - visitors.len()
    }

    /// Number of addresses currently tracked.
    pub fn visitor_count(&self) -> usize {
        self.lock().len()
    }

    // The map stays consistent even if a holder panicked mid-update.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Visitor>> {
        self.visitors.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Spawn the task that periodically evicts idle visitors.
pub fn start_sweeper(limiter: Arc<RateLimiter>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(limiter.config.sweep_interval);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            let removed = limiter.sweep();
            if removed > 0 {
                tracing::debug!(removed, remaining = limiter.visitor_count(), "Rate limiter sweep");
            }
        }
    })
}

/// Reject the request with 429 when the caller's bucket is empty.
///
/// Keyed by peer IP; guests and signed-in users share the same budget.
pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_VISITOR.to_string());

    if !state.rate_limiter.check(&key) {
        tracing::debug!(visitor = %key, "Rate limit exceeded");
        return Err(AppError::TooManyRequests);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(RateLimitConfig::default())
    }

    #[test]
    fn burst_of_ten_then_reject() {
        let limiter = limiter();
        let start = Instant::now();

        for i in 0..10 {
            assert!(limiter.check_at("1.2.3.4", start), "request {i} rejected");
        }
        assert!(!limiter.check_at("1.2.3.4", start));
    }

    #[test]
    fn refill_restores_one_token_per_interval() {
        let limiter = limiter();
        let start = Instant::now();
        for _ in 0..10 {
            limiter.check_at("a", start);
        }
        assert!(!limiter.check_at("a", start + Duration::from_millis(20)));

        let later = start + Duration::from_millis(50);
        assert!(limiter.check_at("a", later));
        assert!(!limiter.check_at("a", later));
    }

    #[test]
    fn bucket_never_exceeds_capacity() {
        let limiter = limiter();
        let start = Instant::now();
        limiter.check_at("a", start);

        let much_later = start + Duration::from_secs(60);
        let allowed = (0..20).filter(|_| limiter.check_at("a", much_later)).count();
        assert_eq!(allowed, 10);
    }

    #[test]
    fn addresses_have_independent_buckets() {
        let limiter = limiter();
        let start = Instant::now();
        for _ in 0..10 {
            limiter.check_at("a", start);
        }
        assert!(!limiter.check_at("a", start));
        assert!(limiter.check_at("b", start));
    }

    #[test]
    fn sweep_evicts_only_idle_visitors() {
        let limiter = limiter();
        let start = Instant::now();
        limiter.check_at("idle", start);
        limiter.check_at("active", start + Duration::from_secs(170));

        assert_eq!(limiter.sweep_at(start + Duration::from_secs(181)), 1);
        assert_eq!(limiter.visitor_count(), 1);

        // An evicted visitor comes back with a full bucket.
        let back = start + Duration::from_secs(182);
        let allowed = (0..11).filter(|_| limiter.check_at("idle", back)).count();
        assert_eq!(allowed, 10);
    }
}
