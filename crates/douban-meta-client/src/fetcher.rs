//! Rate-limited, cached page fetcher.
//!
//! Per URL: cache lookup, then throttle, then request, then store. Only a
//! 2xx body is cached. Every failure except cancellation collapses to
//! `Ok(None)` after a log line.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::throttle::RateLimiter;
use crate::transport::{Transport, TransportRequest, TransportResponse};

/// Shared fetch context: one cache and one limiter for every caller.
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    cache: Mutex<ResponseCache>,
    limiter: RateLimiter,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>, config: &ClientConfig) -> Self {
        Self {
            transport,
            cache: Mutex::new(ResponseCache::new(config.cache_ttl())),
            limiter: RateLimiter::new(config.request_interval()),
        }
    }

    /// Body of `url`, from the cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Cancelled` when `token` fires before or during
    /// the wait or the request. `Ok(None)` means no content.
    pub async fn get(&self, url: &str, token: &CancellationToken) -> Result<Option<String>> {
        if token.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        {
            let mut cache = self.cache.lock().await;
            let now = Instant::now();
            let purged = cache.sweep(now);
            if purged > 0 {
                debug!(purged, "removed expired cache entries");
            }
            if let Some(body) = cache.get(url, now) {
                debug!(url = %url, "cache hit");
                return Ok(Some(body));
            }
        }

        let Some(response) = self.send(TransportRequest::get(url), token).await? else {
            return Ok(None);
        };
        if !response.is_success() {
            return Ok(None);
        }

        self.cache
            .lock()
            .await
            .insert(url, response.body.clone(), Instant::now());
        Ok(Some(response.body))
    }

    /// Final URL after following the redirects of `url`. Never cached.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Cancelled` when `token` fires.
    pub async fn resolve_redirect(&self, url: &str, token: &CancellationToken) -> Result<Option<String>> {
        if token.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        Ok(self
            .send(TransportRequest::head(url), token)
            .await?
            .filter(TransportResponse::is_success)
            .map(|response| response.final_url))
    }

    /// Throttled send raced against `token`. Transport failures and
    /// non-2xx statuses are logged here.
    async fn send(&self, request: TransportRequest, token: &CancellationToken) -> Result<Option<TransportResponse>> {
        self.limiter.acquire(token).await?;

        let url = request.url.clone();
        debug!(url = %url, method = ?request.method, "requesting");
        let outcome = tokio::select! {
            _ = token.cancelled() => return Err(ClientError::Cancelled),
            outcome = self.transport.send(request) => outcome,
        };

        match outcome {
            Ok(response) if response.status == 403 => {
                warn!(url = %url, status = response.status, "request forbidden, a session cookie is likely required");
                Ok(Some(response))
            }
            Ok(response) if !response.is_success() => {
                warn!(url = %url, status = response.status, "unexpected response status");
                Ok(Some(response))
            }
            Ok(response) => Ok(Some(response)),
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            Err(e) => {
                warn!(url = %url, error = %e, "request failed");
                Ok(None)
            }
        }
    }
}
