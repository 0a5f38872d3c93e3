//! Per-IP rate limiting for endpoints that create state or call paid upstreams
//!
//! Buckets are keyed by client IP (`SmartIpKeyExtractor` honours
//! `X-Forwarded-For`/`X-Real-Ip` before the peer address).

use axum::Router;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

use crate::AppState;

/// Shortening: bursts of 10, then one request every 6 seconds
pub const SHORTEN_REPLENISH_SECS: u64 = 6;
pub const SHORTEN_BURST: u32 = 10;

/// Image generation: bursts of 3, then one request every 20 seconds
pub const IMAGE_GEN_REPLENISH_SECS: u64 = 20;
pub const IMAGE_GEN_BURST: u32 = 3;

/// Wrap `router` in a governor layer. `replenish_secs` is the interval in which
/// one spent token comes back.
pub fn rate_limited(
    router: Router<Arc<AppState>>,
    replenish_secs: u64,
    burst: u32,
) -> Router<Arc<AppState>> {
    let config = GovernorConfigBuilder::default()
        .per_second(replenish_secs)
        .burst_size(burst)
        .key_extractor(SmartIpKeyExtractor)
        .finish();

    match config {
        Some(config) => router.layer(GovernorLayer {
            config: config.into(),
        }),
        None => {
            tracing::warn!(replenish_secs, burst, "invalid rate limit settings, serving without limits");
            router
        }
    }
}
