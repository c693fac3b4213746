//! # Douban Meta Core
//!
//! Offline half of the Douban metadata resolver: title heuristics, provider
//! id lookup and catalog page extraction. Nothing here touches the network;
//! the `douban-meta-client` crate feeds fetched pages into these parsers.
//!
//! ## Quick Start
//!
//! ```rust
//! use douban_meta_core::{LookupQuery, SeasonParser, resolve_provider_id};
//!
//! let seasons = SeasonParser::with_default_exclusions().unwrap();
//! let query = LookupQuery::season("进击的巨人 第二季", None)
//!     .with_path("/anime/进击的巨人/Season 2");
//!
//! assert_eq!(seasons.guess_season_index(&query), 2);
//! assert_eq!(resolve_provider_id(&query, false), None);
//! ```
pub mod error;
pub mod html;
pub mod ids;
pub mod numeral;
pub mod parser;
pub mod season;
pub mod types;

// Re-export primary API
pub use error::{MetaError, Result};
pub use html::{DEFAULT_CDN_SERVER, ImageOptions, ResponseParser, SearchIntent};
pub use ids::{personage_id_from_ids, resolve_provider_id};
pub use numeral::{chinese_numeral_to_int, roman_numeral_to_int};
pub use parser::{FileNameParser, Tokenizer};
pub use season::SeasonParser;
pub use types::{
    CastMember, EpisodeSubject, FileNameInfo, IMDB_ID, ImageKind, LookupKind, LookupQuery, MovieSubject,
    PERSONAGE_ID, PERSONAGE_ID_KEYS, PROVIDER_ID, PartialDate, PersonRole, PersonSubject, PhotoCategory,
    ProviderIds, RemoteImage, SUBJECT_ID_KEYS, SearchResult, SeasonOutcome, SubjectType,
};
