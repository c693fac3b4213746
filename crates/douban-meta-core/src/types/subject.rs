use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{IMDB_ID, PROVIDER_ID, ProviderIds};

/// Catalog type tag of a subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectType {
    #[default]
    Movie,
    Series,
    Other(String),
}

impl SubjectType {
    /// Maps a catalog type tag (`电影`, `电视剧`) to a subject type.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "电影" => Self::Movie,
            "电视剧" => Self::Series,
            other => Self::Other(other.to_string()),
        }
    }

    /// The catalog tag for this type.
    pub fn as_tag(&self) -> &str {
        match self {
            Self::Movie => "电影",
            Self::Series => "电视剧",
            Self::Other(tag) => tag,
        }
    }
}

/// A movie or series entry of the catalog.
///
/// `Default` is the not-found sentinel: an empty `sid` means resolution
/// failed and the remaining fields carry no information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieSubject {
    pub sid: String,
    pub name: String,
    pub original_name: Option<String>,
    pub subject_type: SubjectType,
    /// Catalog rating, `0.0` when unrated.
    pub rating: f64,
    /// Photo id of the poster (`p123456`).
    pub poster_id: Option<String>,
    pub year: Option<u16>,
    pub genres: Vec<String>,
    pub countries: Vec<String>,
    pub website: Option<String>,
    /// First release or air date.
    pub screen_date: Option<NaiveDate>,
    pub imdb_id: Option<String>,
    /// Season number, `0` for movies and unknown seasons.
    pub season_index: u32,
    pub episode_count: u32,
    pub intro: Option<String>,
    pub aliases: Vec<String>,
}

impl MovieSubject {
    pub fn is_found(&self) -> bool {
        !self.sid.is_empty()
    }

    pub fn is_series(&self) -> bool {
        self.subject_type == SubjectType::Series
    }

    /// Large poster URL on the given CDN host.
    pub fn poster_url(&self, cdn_server: &str) -> Option<String> {
        self.poster_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| format!("{cdn_server}/view/photo/l/public/{id}.jpg"))
    }
}

/// One episode of a series subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeSubject {
    pub name: Option<String>,
    pub original_name: Option<String>,
    pub air_date: Option<NaiveDate>,
    pub intro: Option<String>,
}

impl EpisodeSubject {
    /// The catalog title, or `Episode {index}` when the catalog has none and
    /// synthesis is enabled.
    pub fn display_name(&self, index: u32, synthesize: bool) -> Option<String> {
        match self.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => Some(name.to_string()),
            None if synthesize => Some(format!("Episode {index}")),
            None => None,
        }
    }
}

/// A search hit projected for the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub name: String,
    pub original_name: Option<String>,
    pub image_url: Option<String>,
    pub overview: Option<String>,
    pub production_year: Option<u16>,
    pub premiere_date: Option<NaiveDate>,
    pub season_index: u32,
    pub provider_ids: ProviderIds,
}

impl SearchResult {
    /// Projects a subject, attaching its catalog id and IMDb id.
    pub fn from_subject(subject: &MovieSubject, cdn_server: &str) -> Self {
        let mut provider_ids = ProviderIds::new();
        provider_ids.insert(PROVIDER_ID.to_string(), subject.sid.clone());
        if let Some(imdb) = subject.imdb_id.as_deref().filter(|id| !id.is_empty()) {
            provider_ids.insert(IMDB_ID.to_string(), imdb.to_string());
        }

        Self {
            name: subject.name.clone(),
            original_name: subject.original_name.clone(),
            image_url: subject.poster_url(cdn_server),
            overview: subject.intro.clone(),
            production_year: subject.year,
            premiere_date: subject.screen_date,
            season_index: subject.season_index,
            provider_ids,
        }
    }

    pub fn sid(&self) -> Option<&str> {
        self.provider_ids.get(PROVIDER_ID).map(String::as_str)
    }
}

/// Result of resolving a season query.
#[derive(Debug, Clone, PartialEq)]
pub enum SeasonOutcome {
    /// The season folder holds specials; assigned season 0 without a lookup.
    Specials { folder: String },
    Matched(MovieSubject),
    NotFound,
}
