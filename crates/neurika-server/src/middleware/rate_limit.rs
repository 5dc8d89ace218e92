//! Per-client rate limiting using tower-governor
//!
//! Clients are keyed by peer IP, so the router must be served with
//! `into_make_service_with_connect_info::<SocketAddr>()`.

use crate::config::RateLimitConfig;
use axum::Router;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

/// Replenishment period and burst size for a per-minute budget
pub fn quota(requests_per_minute: u64) -> Option<(u64, u32)> {
    if requests_per_minute == 0 {
        return None;
    }
    let replenishment_ms = (60_000 / requests_per_minute).max(1);
    let burst_size = u32::try_from(requests_per_minute).unwrap_or(u32::MAX);
    Some((replenishment_ms, burst_size))
}

/// Wrap `router` in a governor layer; a budget of 0 leaves it unlimited
pub fn apply<S>(router: Router<S>, config: &RateLimitConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let Some((replenishment_ms, burst_size)) = quota(config.requests_per_minute) else {
        tracing::info!("Rate limiting disabled");
        return router;
    };

    let Some(governor_conf) = GovernorConfigBuilder::default()
        .per_millisecond(replenishment_ms)
        .burst_size(burst_size)
        .finish()
    else {
        tracing::warn!(
            requests_per_minute = config.requests_per_minute,
            "Invalid rate limit quota, rate limiting disabled"
        );
        return router;
    };

    tracing::info!(
        requests_per_minute = config.requests_per_minute,
        "Rate limiting enabled"
    );

    router.layer(GovernorLayer {
        config: Arc::new(governor_conf),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_disabled_at_zero() {
        assert_eq!(quota(0), None);
    }

    #[test]
    fn test_quota_per_minute() {
        assert_eq!(quota(120), Some((500, 120)));
        assert_eq!(quota(100), Some((600, 100)));
    }

    #[test]
    fn test_quota_never_zero_period() {
        assert_eq!(quota(120_000), Some((1, 120_000)));
    }

    #[test]
    fn test_apply_builds_router() {
        let router: Router = Router::new();
        let router = apply(router, &RateLimitConfig { requests_per_minute: 60 });
        assert!(format!("{:?}", router).contains("Router"));
    }
}
