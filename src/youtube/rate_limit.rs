//! Request rate limiting for the Data API quota

use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::trace;

/// Shared limiter applied to every outgoing API request.
///
/// The platform enforces a daily quota and throttles bursts; a single
/// process-wide limiter keeps pagination loops and concurrent comment
/// fetches inside a steady request rate.
#[derive(Clone)]
pub struct ApiRateLimiter {
    limiter: Arc<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
}

impl ApiRateLimiter {
    /// Create a limiter allowing `requests_per_second` requests
    pub fn new(requests_per_second: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second).unwrap_or(nonzero!(1u32));
        let quota = Quota::per_second(rps);

        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Wait until the next request is allowed
    pub async fn acquire(&self) {
        trace!("Acquiring API rate limit slot");
        self.limiter.until_ready().await;
    }
}
