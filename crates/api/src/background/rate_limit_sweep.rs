//! Periodic eviction of idle rate-limiter entries.
//!
//! Without it the limiter map grows by one entry per distinct client
//! address for the life of the process.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::middleware::rate_limit::RateLimiter;

/// How often the sweep runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Entries idle for longer than this are evicted.
pub const MAX_IDLE: Duration = Duration::from_secs(5 * 60);

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(limiter: Arc<RateLimiter>, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = SWEEP_INTERVAL.as_secs(),
        max_idle_secs = MAX_IDLE.as_secs(),
        "Rate limiter sweep started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);
    // The first tick completes immediately; nothing is idle yet.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Rate limiter sweep stopping");
                break;
            }
            _ = interval.tick() => {
                let evicted = limiter.evict_idle(Instant::now(), MAX_IDLE);
                if evicted > 0 {
                    tracing::debug!(
                        evicted,
                        remaining = limiter.tracked_clients(),
                        "Rate limiter sweep: evicted idle clients"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::middleware::rate_limit::RateLimitConfig;

    use super::*;

    #[tokio::test]
    async fn test_sweep_stops_on_cancel() {
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
            interval: Duration::from_millis(100),
            burst: 5,
        }));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(Arc::clone(&limiter), cancel.clone()));

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweep should stop promptly")
            .expect("sweep task should not panic");
    }
}
