use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::time::{sleep, Duration, Instant};

/// Bounds outbound provider traffic: a concurrency cap plus a minimum delay
/// between request starts. Free-tier data APIs throttle hard, so multi-ticker
/// fan-out must go through one of these.
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    last_request: Arc<Mutex<Instant>>,
    min_delay: Duration,
}

impl RateLimiter {
    /// `max_concurrent` simultaneous requests, at most `requests_per_minute`
    /// request starts per minute.
    pub fn new(max_concurrent: usize, requests_per_minute: u32) -> Self {
        let min_delay_ms = 60_000 / requests_per_minute.max(1) as u64;
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            last_request: Arc::new(Mutex::new(Instant::now() - Duration::from_secs(60))),
            min_delay: Duration::from_millis(min_delay_ms),
        }
    }

    /// Waits for a permit and for the spacing delay, then returns a guard
    /// that releases the permit when dropped.
    pub async fn acquire(&self) -> RateLimitGuard {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore closed");

        let wait_time = {
            let last = self.last_request.lock();
            let elapsed = last.elapsed();
            (elapsed < self.min_delay).then(|| self.min_delay - elapsed)
        }; // lock dropped before sleeping

        if let Some(delay) = wait_time {
            sleep(delay).await;
        }

        *self.last_request.lock() = Instant::now();

        RateLimitGuard { _permit: permit }
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

pub struct RateLimitGuard {
    _permit: tokio::sync::OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant as StdInstant;

    #[tokio::test]
    async fn enforces_spacing_between_requests() {
        // 60/min = one request per second
        let limiter = RateLimiter::new(2, 60);

        let start = StdInstant::now();

        let guard1 = limiter.acquire().await;
        assert!(start.elapsed().as_millis() < 100, "first request is immediate");
        drop(guard1);

        let _guard2 = limiter.acquire().await;
        assert!(
            start.elapsed().as_millis() >= 900,
            "second request waits ~1 second"
        );
    }

    #[tokio::test]
    async fn caps_concurrency() {
        let limiter = Arc::new(RateLimiter::new(2, 600));

        let g1 = limiter.acquire().await;
        let _g2 = limiter.acquire().await;
        assert_eq!(limiter.available_permits(), 0);

        drop(g1);
        let _g3 = limiter.acquire().await;
        assert_eq!(limiter.available_permits(), 0);
    }
}
