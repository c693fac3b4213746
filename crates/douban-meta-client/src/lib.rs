//! # Douban Meta Client
//!
//! Network half of the Douban metadata resolver. Pages are fetched through
//! one rate-limited, cached [`Fetcher`], parsed by `douban-meta-core`, and
//! combined into movie, series, season, episode and person records by the
//! [`TitleResolver`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use douban_meta_client::{ClientConfig, DoubanClient, TitleResolver};
//! use douban_meta_core::LookupQuery;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> douban_meta_client::Result<()> {
//! let config = ClientConfig::default().with_request_interval(Duration::from_secs(3));
//! let resolver = TitleResolver::new(Arc::new(DoubanClient::new(config)?))?;
//!
//! let query = LookupQuery::series("三体").with_year(2023);
//! let results = resolver.search_results(&query, &CancellationToken::new()).await?;
//! for result in results {
//!     println!("{} {:?}", result.name, result.sid());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure model
//!
//! Missing pages, non-2xx responses, transport errors and unexpected markup
//! all come back as empty lists or not-found records. The only error a
//! lookup returns is [`ClientError::Cancelled`].
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod resolver;
pub mod throttle;
pub mod transport;

// Re-export primary API
pub use api::{DoubanClient, Endpoints};
pub use config::{ClientConfig, DEFAULT_USER_AGENT};
pub use error::{ClientError, Result};
pub use fetcher::Fetcher;
pub use resolver::{ResolvedEpisode, TitleResolver};
pub use transport::{Method, ReqwestTransport, Transport, TransportRequest, TransportResponse};
