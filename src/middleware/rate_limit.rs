use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

use crate::error::AppError;

/// Paths served even when every permit is taken.
const UNLIMITED_PATHS: [&str; 2] = ["/health", "/ready"];

/// Caps in-flight validation requests at `Config::max_concurrent_requests`.
/// Requests over the cap are refused right away, never queued.
#[derive(Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
    total_requests: AtomicU64,
    rejected_requests: AtomicU64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LimiterMetrics {
    pub max_concurrent: usize,
    pub available_permits: usize,
    pub total_requests: u64,
    pub rejected_requests: u64,
}

impl LimiterMetrics {
    pub fn rejection_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        (self.rejected_requests as f64 / self.total_requests as f64 * 100.0).round() / 100.0
    }
}

impl ConcurrencyLimiter {
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        info!(max_concurrent_requests = max_concurrent, "Initializing request limiter");
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            total_requests: AtomicU64::new(0),
            rejected_requests: AtomicU64::new(0),
        }
    }

    /// Take a permit for one request; released when the permit drops.
    pub fn try_admit(&self) -> Result<OwnedSemaphorePermit, AppError> {
        let total = self.total_requests.fetch_add(1, Ordering::Relaxed) + 1;
        self.semaphore.clone().try_acquire_owned().map_err(|_| {
            let rejected = self.rejected_requests.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(
                total_requests = total,
                rejected_requests = rejected,
                max_concurrent = self.max_concurrent,
                "Rate limit exceeded - too many concurrent requests"
            );
            AppError::RateLimitExceeded
        })
    }

    pub fn metrics(&self) -> LimiterMetrics {
        LimiterMetrics {
            max_concurrent: self.max_concurrent,
            available_permits: self.semaphore.available_permits(),
            total_requests: self.total_requests.load(Ordering::Relaxed),
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
        }
    }
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<ConcurrencyLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();
    if UNLIMITED_PATHS.iter().any(|p| *p == path) {
        return Ok(next.run(request).await);
    }

    let _permit = limiter.try_admit()?;

    debug!(
        path = %path,
        available_permits = limiter.metrics().available_permits,
        "Request permit acquired"
    );

    Ok(next.run(request).await)
}
