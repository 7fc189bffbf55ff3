//! Request throttling using the governor crate.

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use tracing::{debug, warn};

use crate::AppState;
use crate::config::RateLimitConfig;
use crate::error::AppError;

/// Bucket a request is charged to.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum RateLimitKey {
    Ip(IpAddr),
    /// Shared bucket when per-IP limiting is off or the peer is unknown.
    Global,
}

type KeyedLimiter = RateLimiter<RateLimitKey, DefaultKeyedStateStore<RateLimitKey>, DefaultClock>;

/// Token buckets, one per [`RateLimitKey`], created on first use.
pub struct ClientRateLimiter {
    limiter: KeyedLimiter,
    quota: Quota,
    per_ip: bool,
}

impl std::fmt::Debug for ClientRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRateLimiter")
            .field("quota", &self.quota)
            .field("per_ip", &self.per_ip)
            .finish_non_exhaustive()
    }
}

impl ClientRateLimiter {
    pub fn new(quota: Quota, per_ip: bool) -> Self {
        Self {
            limiter: RateLimiter::keyed(quota),
            quota,
            per_ip,
        }
    }

    /// `requests_per_minute` sustained, `burst` at once.
    pub fn from_config(config: &RateLimitConfig) -> Self {
        let rate = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst).unwrap_or(NonZeroU32::MIN);
        Self::new(Quota::per_minute(rate).allow_burst(burst), config.per_ip)
    }

    pub fn key_for(&self, peer: Option<IpAddr>) -> RateLimitKey {
        match peer {
            Some(ip) if self.per_ip => RateLimitKey::Ip(ip),
            _ => RateLimitKey::Global,
        }
    }

    /// Charge one request to `key`. On rejection returns the seconds until
    /// the next request would be admitted.
    pub fn check(&self, key: RateLimitKey) -> Result<(), u64> {
        self.limiter.check_key(&key).map_err(|not_until| {
            let wait = not_until.wait_time_from(DefaultClock::default().now());
            wait.as_secs().max(1)
        })
    }

    /// Number of buckets currently tracked.
    pub fn limiter_count(&self) -> usize {
        self.limiter.len()
    }

    /// Drop buckets that have fully refilled. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        before.saturating_sub(self.limiter.len())
    }

    /// Spawn a periodic [`prune`](Self::prune) on the current tokio runtime.
    pub fn spawn_pruner(self: &Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let removed = limiter.prune();
                if removed > 0 {
                    debug!(removed, remaining = limiter.limiter_count(), "rate limiter prune");
                }
            }
        })
    }
}

/// Axum middleware: rejects requests over quota with 429.
pub async fn limit_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let key = state.rate_limiter.key_for(peer);

    if let Err(retry_after_secs) = state.rate_limiter.check(key) {
        warn!(?key, retry_after_secs, "rate limit exceeded");
        return Err(AppError::RateLimited { retry_after_secs });
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    fn limiter(burst: u32, per_ip: bool) -> ClientRateLimiter {
        ClientRateLimiter::from_config(&RateLimitConfig {
            enabled: true,
            requests_per_minute: 1,
            burst,
            per_ip,
        })
    }

    #[test]
    fn allows_burst_then_rejects() {
        let limiter = limiter(2, true);
        let key = limiter.key_for(Some(IpAddr::V4(Ipv4Addr::LOCALHOST)));

        assert!(limiter.check(key).is_ok());
        assert!(limiter.check(key).is_ok());
        let retry = limiter.check(key).unwrap_err();
        assert!(retry >= 1);
    }

    #[test]
    fn clients_have_separate_buckets() {
        let limiter = limiter(1, true);
        let a = limiter.key_for(Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))));
        let b = limiter.key_for(Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))));

        assert!(limiter.check(a).is_ok());
        assert!(limiter.check(a).is_err());
        assert!(limiter.check(b).is_ok());
        assert_eq!(limiter.limiter_count(), 2);
    }

    #[test]
    fn shared_bucket_when_per_ip_is_off() {
        let limiter = limiter(1, false);
        let a = limiter.key_for(Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))));
        let b = limiter.key_for(Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))));
        assert_eq!(a, RateLimitKey::Global);

        assert!(limiter.check(a).is_ok());
        assert!(limiter.check(b).is_err());
    }

    #[test]
    fn prune_drops_refilled_buckets() {
        let limiter = ClientRateLimiter::new(Quota::per_second(NonZeroU32::new(1000).unwrap()), true);
        let a = limiter.key_for(Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))));
        let b = limiter.key_for(Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))));
        assert!(limiter.check(a).is_ok());
        assert!(limiter.check(b).is_ok());
        assert_eq!(limiter.limiter_count(), 2);

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(limiter.prune(), 2);
        assert_eq!(limiter.limiter_count(), 0);
    }

    #[test]
    fn prune_keeps_buckets_still_refilling() {
        let limiter = limiter(1, true);
        let key = limiter.key_for(Some(IpAddr::V4(Ipv4Addr::LOCALHOST)));
        assert!(limiter.check(key).is_ok());

        assert_eq!(limiter.prune(), 0);
        assert_eq!(limiter.limiter_count(), 1);
        assert!(limiter.check(key).is_err());
    }

    #[test]
    fn unknown_peer_uses_shared_bucket() {
        let limiter = limiter(1, true);
        assert_eq!(limiter.key_for(None), RateLimitKey::Global);
    }
}
