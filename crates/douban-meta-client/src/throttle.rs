use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, Result};

/// Process-wide request pacing.
///
/// Each caller reserves the next free slot under the lock and then sleeps
/// outside it, so concurrent callers queue up `interval` apart without
/// holding the lock while waiting. A cancelled wait gives up its slot
/// without releasing it.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_allowed: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_allowed: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits for the next request slot.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Cancelled` as soon as `token` fires, before or
    /// during the wait.
    pub async fn acquire(&self, token: &CancellationToken) -> Result<()> {
        if token.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        let slot = {
            let mut next = self.next_allowed.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(at) if at > now => at,
                _ => now,
            };
            *next = Some(slot + self.interval);
            slot
        };

        let delay = slot.saturating_duration_since(Instant::now());
        if delay.is_zero() {
            return Ok(());
        }

        tracing::debug!(delay_ms = delay.as_millis() as u64, "throttling request");
        tokio::select! {
            _ = token.cancelled() => Err(ClientError::Cancelled),
            _ = sleep_until(slot) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_request_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_secs(2));
        let start = Instant::now();
        limiter.acquire(&CancellationToken::new()).await.unwrap();
        assert_eq!(Instant::now(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn spaces_consecutive_requests() {
        let limiter = RateLimiter::new(Duration::from_secs(2));
        let token = CancellationToken::new();
        let start = Instant::now();

        limiter.acquire(&token).await.unwrap();
        limiter.acquire(&token).await.unwrap();
        assert!(Instant::now() - start >= Duration::from_secs(2));
        limiter.acquire(&token).await.unwrap();
        assert!(Instant::now() - start >= Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_time_counts_toward_spacing() {
        let limiter = RateLimiter::new(Duration::from_secs(2));
        let token = CancellationToken::new();

        limiter.acquire(&token).await.unwrap();
        tokio::time::advance(Duration::from_secs(5)).await;
        let before = Instant::now();
        limiter.acquire(&token).await.unwrap();
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_wait_returns_immediately() {
        let limiter = RateLimiter::new(Duration::from_secs(60));
        let token = CancellationToken::new();
        limiter.acquire(&token).await.unwrap();

        token.cancel();
        let start = Instant::now();
        let err = limiter.acquire(&token).await.unwrap_err();
        assert!(matches!(err, ClientError::Cancelled));
        assert_eq!(Instant::now(), start);
    }
}
