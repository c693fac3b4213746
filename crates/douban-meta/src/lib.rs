//! # Douban Meta
//!
//! Resolves loosely named movies, series, seasons, episodes and people to
//! Douban catalog records.
//!
//! This crate re-exports the two halves of the resolver:
//!
//! - [`douban_meta_core`]: offline title heuristics, provider id lookup and
//!   page parsers
//! - [`douban_meta_client`]: the rate-limited, cached fetcher and the
//!   [`TitleResolver`]
//!
//! ## Quick Start
//!
//! ```rust
//! use douban_meta::{LookupQuery, SeasonParser};
//!
//! let seasons = SeasonParser::with_default_exclusions().unwrap();
//! let query = LookupQuery::season("Season 2", Some(2)).with_series_name("洛基");
//!
//! assert_eq!(seasons.guess_season_index(&query), 2);
//! assert_eq!(seasons.replace_season_index_with("洛基 第一季", 2), "洛基 第2季");
//! ```
pub use douban_meta_client;
pub use douban_meta_core;

pub use douban_meta_client::{ClientConfig, ClientError, DoubanClient, ResolvedEpisode, TitleResolver};
pub use douban_meta_core::{
    CastMember, EpisodeSubject, IMDB_ID, LookupKind, LookupQuery, MetaError, MovieSubject, PERSONAGE_ID,
    PROVIDER_ID, PersonSubject, RemoteImage, SearchResult, SeasonOutcome, SeasonParser,
};
