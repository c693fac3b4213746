use std::time::Duration;

use douban_meta_core::season::DEFAULT_TRAILING_NUMBER_EXCLUSIONS;
use douban_meta_core::{DEFAULT_CDN_SERVER, ImageOptions};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Desktop browser identity sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Client configuration.
///
/// Every field has a default, so a partial TOML file is enough:
///
/// ```toml
/// cookie = "bid=abc; dbcl2=\"...\""
/// request_interval_ms = 3000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Minimum spacing between two real network calls.
    pub request_interval_ms: u64,
    /// Per-request timeout.
    pub timeout_ms: u64,
    /// Session cookie; empty means anonymous access.
    pub cookie: String,
    /// Image host that replaces `https://imgN.doubanio.com`.
    pub cdn_server: String,
    /// Attach cast avatars.
    pub fetch_celebrity_images: bool,
    /// Include stage photos in image lists.
    pub fetch_stage_photos: bool,
    /// Classify photos as primary or backdrop by width and height.
    pub distinguish_using_aspect_ratio: bool,
    /// Re-search with the season-1 title when the top hit is a later season.
    pub optimize_for_first_season: bool,
    /// Name untitled episodes `Episode N`.
    pub synthesize_episode_titles: bool,
    /// Response cache lifetime.
    pub cache_ttl_secs: u64,
    /// Prefixes after which a trailing number is not a season number.
    pub trailing_number_exclusions: Vec<String>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_interval_ms: 2000,
            timeout_ms: 8000,
            cookie: String::new(),
            cdn_server: DEFAULT_CDN_SERVER.to_string(),
            fetch_celebrity_images: true,
            fetch_stage_photos: true,
            distinguish_using_aspect_ratio: true,
            optimize_for_first_season: true,
            synthesize_episode_titles: false,
            cache_ttl_secs: 24 * 60 * 60,
            trailing_number_exclusions: DEFAULT_TRAILING_NUMBER_EXCLUSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum spacing between network calls.
    pub fn with_request_interval(mut self, interval: Duration) -> Self {
        self.request_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the session cookie.
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = cookie.into();
        self
    }

    /// Set the image host.
    pub fn with_cdn_server(mut self, cdn_server: impl Into<String>) -> Self {
        self.cdn_server = cdn_server.into();
        self
    }

    pub fn with_celebrity_images(mut self, enabled: bool) -> Self {
        self.fetch_celebrity_images = enabled;
        self
    }

    pub fn with_stage_photos(mut self, enabled: bool) -> Self {
        self.fetch_stage_photos = enabled;
        self
    }

    pub fn with_aspect_ratio_classification(mut self, enabled: bool) -> Self {
        self.distinguish_using_aspect_ratio = enabled;
        self
    }

    pub fn with_first_season_optimization(mut self, enabled: bool) -> Self {
        self.optimize_for_first_season = enabled;
        self
    }

    pub fn with_synthesized_episode_titles(mut self, enabled: bool) -> Self {
        self.synthesize_episode_titles = enabled;
        self
    }

    /// Set the response cache lifetime.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = ttl.as_secs();
        self
    }

    /// Replace the trailing-number exclusion list.
    pub fn with_trailing_number_exclusions<I, S>(mut self, exclusions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trailing_number_exclusions = exclusions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Checks values that would make the client unusable.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` for a zero timeout or an empty CDN host.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(ClientError::Config("timeout_ms must be positive".into()));
        }
        if self.cdn_server.trim().is_empty() {
            return Err(ClientError::Config("cdn_server must not be empty".into()));
        }
        Ok(())
    }

    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// The CDN host without a trailing slash.
    pub fn cdn(&self) -> &str {
        self.cdn_server.trim_end_matches('/')
    }

    /// Image switches for the response parser.
    pub fn image_options(&self) -> ImageOptions {
        ImageOptions {
            cdn_server: self.cdn().to_string(),
            fetch_celebrity_images: self.fetch_celebrity_images,
            distinguish_using_aspect_ratio: self.distinguish_using_aspect_ratio,
        }
    }
}
