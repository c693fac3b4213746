use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ProviderIds;

/// The entity kind being resolved, with the fields only that kind carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LookupKind {
    /// A theatrical or standalone release.
    #[default]
    Movie,
    /// A whole series.
    Series,
    /// One season of a series.
    Season {
        /// Season number reported by the host, if any.
        index: Option<u32>,
        /// Display name of the parent series, if already resolved.
        series_name: Option<String>,
        /// Provider ids of the parent series.
        series_ids: ProviderIds,
    },
    /// One episode of a season.
    Episode {
        /// Episode number reported by the host, if any.
        index: Option<u32>,
        /// Season number reported by the host, if any.
        season_index: Option<u32>,
        /// Provider ids of the parent season.
        season_ids: ProviderIds,
        /// Provider ids of the parent series.
        series_ids: ProviderIds,
    },
    /// A cast or crew member.
    Person,
}

/// A loosely identified item to resolve against the catalog.
///
/// Queries are immutable once built; the `with_*` methods consume and
/// return the query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupQuery {
    /// Entity kind and its kind-specific fields.
    pub kind: LookupKind,
    /// Display name.
    pub name: String,
    /// Original-language title.
    pub original_title: Option<String>,
    /// Path of the media file or folder.
    pub path: Option<String>,
    /// Production year.
    pub year: Option<u16>,
    /// Known provider identifiers of the item itself.
    pub provider_ids: ProviderIds,
}

impl LookupQuery {
    fn with_kind(kind: LookupKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn movie(name: impl Into<String>) -> Self {
        Self::with_kind(LookupKind::Movie, name)
    }

    pub fn series(name: impl Into<String>) -> Self {
        Self::with_kind(LookupKind::Series, name)
    }

    pub fn season(name: impl Into<String>, index: Option<u32>) -> Self {
        Self::with_kind(
            LookupKind::Season {
                index,
                series_name: None,
                series_ids: ProviderIds::new(),
            },
            name,
        )
    }

    pub fn episode(name: impl Into<String>, index: Option<u32>, season_index: Option<u32>) -> Self {
        Self::with_kind(
            LookupKind::Episode {
                index,
                season_index,
                season_ids: ProviderIds::new(),
                series_ids: ProviderIds::new(),
            },
            name,
        )
    }

    pub fn person(name: impl Into<String>) -> Self {
        Self::with_kind(LookupKind::Person, name)
    }

    #[must_use]
    pub fn with_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    #[must_use]
    pub fn with_original_title(mut self, title: impl Into<String>) -> Self {
        self.original_title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_provider_id(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.provider_ids.insert(key.into(), value.into());
        self
    }

    /// Sets the parent series name. Ignored for kinds without a parent name.
    #[must_use]
    pub fn with_series_name(mut self, name: impl Into<String>) -> Self {
        if let LookupKind::Season { series_name, .. } = &mut self.kind {
            *series_name = Some(name.into());
        }
        self
    }

    /// Adds a parent series id. Ignored for kinds without a parent series.
    #[must_use]
    pub fn with_series_id(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match &mut self.kind {
            LookupKind::Season { series_ids, .. } | LookupKind::Episode { series_ids, .. } => {
                series_ids.insert(key.into(), value.into());
            }
            _ => {}
        }
        self
    }

    /// Adds a parent season id. Ignored for kinds other than episodes.
    #[must_use]
    pub fn with_season_id(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let LookupKind::Episode { season_ids, .. } = &mut self.kind {
            season_ids.insert(key.into(), value.into());
        }
        self
    }

    /// Final path component of [`path`](Self::path).
    pub fn file_name(&self) -> Option<&str> {
        let path = self.path.as_deref()?;
        Path::new(path).file_name()?.to_str()
    }

    /// Name of the folder that contains [`path`](Self::path).
    pub fn parent_folder_name(&self) -> Option<&str> {
        let path = self.path.as_deref()?;
        Path::new(path).parent()?.file_name()?.to_str()
    }

    /// Season number hint carried by season and episode queries.
    pub fn season_hint(&self) -> Option<u32> {
        match &self.kind {
            LookupKind::Season { index, .. } => *index,
            LookupKind::Episode { season_index, .. } => *season_index,
            _ => None,
        }
    }

    /// Episode number hint carried by episode queries.
    pub fn episode_hint(&self) -> Option<u32> {
        match &self.kind {
            LookupKind::Episode { index, .. } => *index,
            _ => None,
        }
    }

    /// Parent series ids; `None` for kinds without a parent.
    pub fn series_ids(&self) -> Option<&ProviderIds> {
        match &self.kind {
            LookupKind::Season { series_ids, .. } | LookupKind::Episode { series_ids, .. } => {
                Some(series_ids)
            }
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            LookupKind::Movie => "movie",
            LookupKind::Series => "series",
            LookupKind::Season { .. } => "season",
            LookupKind::Episode { .. } => "episode",
            LookupKind::Person => "person",
        }
    }

    pub fn is_movie(&self) -> bool {
        matches!(self.kind, LookupKind::Movie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IMDB_ID, PROVIDER_ID};

    #[test]
    fn path_helpers() {
        let q = LookupQuery::episode("第 1 集", Some(1), Some(1))
            .with_path("/media/anime/Lycoris Recoil/Season 1/[Nekomoe] Lycoris Recoil - 01.mkv");

        assert_eq!(q.file_name(), Some("[Nekomoe] Lycoris Recoil - 01.mkv"));
        assert_eq!(q.parent_folder_name(), Some("Season 1"));
    }

    #[test]
    fn path_helpers_without_path() {
        let q = LookupQuery::movie("三体");
        assert_eq!(q.file_name(), None);
        assert_eq!(q.parent_folder_name(), None);
    }

    #[test]
    fn hints_follow_kind() {
        assert_eq!(LookupQuery::season("洛基", Some(1)).season_hint(), Some(1));
        assert_eq!(LookupQuery::episode("x", Some(4), Some(2)).season_hint(), Some(2));
        assert_eq!(LookupQuery::episode("x", Some(4), Some(2)).episode_hint(), Some(4));
        assert_eq!(LookupQuery::series("x").season_hint(), None);
    }

    #[test]
    fn parent_ids_only_on_hierarchical_kinds() {
        let q = LookupQuery::season("洛基", Some(2)).with_series_id(PROVIDER_ID, "30331432");
        assert_eq!(
            q.series_ids().and_then(|ids| ids.get(PROVIDER_ID)).map(String::as_str),
            Some("30331432")
        );

        let q = LookupQuery::movie("x").with_series_id(PROVIDER_ID, "1");
        assert!(q.series_ids().is_none());
    }

    #[test]
    fn query_serializes_with_tagged_kind() {
        let q = LookupQuery::series("三体")
            .with_year(2024)
            .with_provider_id(IMDB_ID, "tt20242042");
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["kind"]["type"], "series");

        let back: LookupQuery = serde_json::from_value(json).unwrap();
        assert_eq!(back, q);
    }
}
