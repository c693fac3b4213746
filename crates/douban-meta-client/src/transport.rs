//! HTTP seam of the client.
//!
//! The fetcher only sees the [`Transport`] trait, so tests can replace the
//! network with canned pages.

use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE, HeaderMap, HeaderValue, REFERER, USER_AGENT};
use reqwest::redirect::Policy;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

pub const ACCEPT_LANGUAGE_VALUE: &str = "zh-CN,zh;q=0.9,en;q=0.8";
pub const REFERER_VALUE: &str = "https://movie.douban.com/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    /// Used to follow redirects without downloading the page.
    Head,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
}

impl TransportRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
        }
    }

    pub fn head(url: impl Into<String>) -> Self {
        Self {
            method: Method::Head,
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// URL after redirects.
    pub final_url: String,
    /// Empty for `HEAD` requests.
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request. Implementations follow redirects and apply their own
/// timeout; a non-2xx status is a successful send.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// [`Transport`] backed by `reqwest` with the catalog's fixed headers.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds the HTTP client from `config`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` when the user agent or cookie is not a
    /// valid header value, and `ClientError::Http` when the client cannot be
    /// built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value("user_agent", &config.user_agent)?);
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
        headers.insert(REFERER, HeaderValue::from_static(REFERER_VALUE));
        if !config.cookie.trim().is_empty() {
            let mut cookie = header_value("cookie", config.cookie.trim())?;
            cookie.set_sensitive(true);
            headers.insert(COOKIE, cookie);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .redirect(Policy::limited(10))
            .build()?;

        Ok(Self { client })
    }
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ClientError::Config(format!("{field}: {e}")))
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Head => self.client.head(&request.url),
        };
        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = match request.method {
            Method::Get => response
                .text()
                .await
                .map_err(|e| ClientError::Transport(e.to_string()))?,
            Method::Head => String::new(),
        };

        Ok(TransportResponse {
            status,
            final_url,
            body,
        })
    }
}
