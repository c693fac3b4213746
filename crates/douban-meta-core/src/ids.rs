//! Provider identifier lookup across current and legacy keys.
//!
//! Every function returns `None` for "unknown id"; a parsed id is always
//! non-zero.

use crate::types::{LookupKind, LookupQuery, PERSONAGE_ID_KEYS, ProviderIds, SUBJECT_ID_KEYS};

const EPISODE_ID_SEPARATOR: &str = "/episode/";

/// Resolves the catalog subject id of a query.
///
/// Own ids are tried under [`SUBJECT_ID_KEYS`] in order. Episodes look at
/// the parent season ids first, then at their own `{sid}/episode/{n}` id.
/// Seasons and episodes fall back to the parent series ids only when the
/// season hint says "likely season 1" (`< 2`, or absent) or when
/// `ignore_season_hint` is set. A `[douban=NNN]` tag in the file name is
/// the last resort.
pub fn resolve_provider_id(query: &LookupQuery, ignore_season_hint: bool) -> Option<u64> {
    let likely_first_season = ignore_season_hint || query.season_hint().unwrap_or(0) < 2;

    let local = match &query.kind {
        LookupKind::Episode { season_ids, .. } => {
            subject_id_from_ids(season_ids).or_else(|| episode_subject_id(&query.provider_ids))
        }
        _ => subject_id_from_ids(&query.provider_ids),
    };

    local
        .or_else(|| {
            query
                .series_ids()
                .filter(|_| likely_first_season)
                .and_then(subject_id_from_ids)
        })
        .or_else(|| query.file_name().and_then(id_from_file_tag))
}

/// First parseable id under [`SUBJECT_ID_KEYS`].
pub fn subject_id_from_ids(ids: &ProviderIds) -> Option<u64> {
    first_id(ids, &SUBJECT_ID_KEYS)
}

/// First parseable id under [`PERSONAGE_ID_KEYS`].
pub fn personage_id_from_ids(ids: &ProviderIds) -> Option<u64> {
    first_id(ids, &PERSONAGE_ID_KEYS)
}

/// The subject part of an episode id (`35196946/episode/3` gives `35196946`).
pub fn episode_subject_id(ids: &ProviderIds) -> Option<u64> {
    SUBJECT_ID_KEYS.iter().find_map(|key| {
        let value = ids.get(*key)?;
        let (sid, _) = value.split_once(EPISODE_ID_SEPARATOR)?;
        parse_id(sid)
    })
}

/// Provider id stored for a resolved episode.
pub fn episode_provider_id(sid: &str, index: u32) -> String {
    format!("{sid}{EPISODE_ID_SEPARATOR}{index}")
}

/// Id embedded in a file name as `[douban=NNN]`, `[doubanid=NNN]` or
/// `[douban-NNN]`, case-insensitive.
pub fn id_from_file_tag(file_name: &str) -> Option<u64> {
    // ASCII lowercasing keeps byte offsets stable.
    let lowered = file_name.to_ascii_lowercase();
    lowered.match_indices("[douban").find_map(|(pos, tag)| {
        let rest = &lowered[pos + tag.len()..];
        let rest = rest.strip_prefix("id").unwrap_or(rest);
        let rest = rest.strip_prefix(['=', '-'])?;
        let (digits, _) = rest.split_once(']')?;
        parse_id(digits)
    })
}

/// Personage id from a `/personage/{pid}/` URL.
pub fn personage_id_from_url(url: &str) -> Option<u64> {
    id_after_segment(url, "/personage/")
}

/// Celebrity id from a `/celebrity/{cid}/` URL.
pub fn celebrity_id_from_url(url: &str) -> Option<u64> {
    id_after_segment(url, "/celebrity/")
}

fn id_after_segment(url: &str, segment: &str) -> Option<u64> {
    let (_, rest) = url.split_once(segment)?;
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    parse_id(&rest[..end])
}

fn first_id(ids: &ProviderIds, keys: &[&str]) -> Option<u64> {
    keys.iter()
        .find_map(|key| ids.get(*key).and_then(|v| parse_id(v)))
}

fn parse_id(text: &str) -> Option<u64> {
    text.trim().parse::<u64>().ok().filter(|id| *id != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PERSONAGE_ID_LEGACY, PROVIDER_ID, PROVIDER_ID_LEGACY, PROVIDER_ID_OPEN_DOUBAN};

    #[test]
    fn own_keys_in_order() {
        let q = LookupQuery::movie("x")
            .with_provider_id(PROVIDER_ID_LEGACY, "2")
            .with_provider_id(PROVIDER_ID_OPEN_DOUBAN, "3");
        assert_eq!(resolve_provider_id(&q, false), Some(2));

        let q = LookupQuery::movie("x")
            .with_provider_id(PROVIDER_ID, "abc")
            .with_provider_id(PROVIDER_ID_OPEN_DOUBAN, "3");
        assert_eq!(resolve_provider_id(&q, false), Some(3));
    }

    #[test]
    fn zero_and_blank_are_unknown() {
        let q = LookupQuery::movie("x").with_provider_id(PROVIDER_ID, "0");
        assert_eq!(resolve_provider_id(&q, false), None);

        let q = LookupQuery::movie("x").with_provider_id(PROVIDER_ID, "  ");
        assert_eq!(resolve_provider_id(&q, false), None);
    }

    #[test]
    fn season_falls_back_to_series_for_first_season() {
        let q = LookupQuery::season("洛基", Some(1)).with_series_id(PROVIDER_ID, "30331432");
        assert_eq!(resolve_provider_id(&q, false), Some(30331432));

        let q = LookupQuery::season("洛基", None).with_series_id(PROVIDER_ID, "30331432");
        assert_eq!(resolve_provider_id(&q, false), Some(30331432));
    }

    #[test]
    fn later_season_ignores_series_unless_asked() {
        let q = LookupQuery::season("洛基 第二季", Some(2)).with_series_id(PROVIDER_ID, "30331432");
        assert_eq!(resolve_provider_id(&q, false), None);
        assert_eq!(resolve_provider_id(&q, true), Some(30331432));
    }

    #[test]
    fn episode_prefers_season_then_own_then_series() {
        let base = LookupQuery::episode("第 3 集", Some(3), Some(1))
            .with_series_id(PROVIDER_ID, "111")
            .with_provider_id(PROVIDER_ID, "222/episode/3");

        let q = base.clone().with_season_id(PROVIDER_ID_LEGACY, "333");
        assert_eq!(resolve_provider_id(&q, false), Some(333));

        assert_eq!(resolve_provider_id(&base, false), Some(222));

        let q = LookupQuery::episode("第 3 集", Some(3), Some(1)).with_series_id(PROVIDER_ID, "111");
        assert_eq!(resolve_provider_id(&q, false), Some(111));

        let q = LookupQuery::episode("第 3 集", Some(3), Some(2)).with_series_id(PROVIDER_ID, "111");
        assert_eq!(resolve_provider_id(&q, false), None);
    }

    #[test]
    fn file_tag_is_last_resort() {
        let q = LookupQuery::movie("三体").with_path("/movies/三体 [douban=35196946].mkv");
        assert_eq!(resolve_provider_id(&q, false), Some(35196946));

        let q = LookupQuery::movie("三体")
            .with_provider_id(PROVIDER_ID, "1")
            .with_path("/movies/三体 [douban=35196946].mkv");
        assert_eq!(resolve_provider_id(&q, false), Some(1));
    }

    #[test]
    fn file_tag_variants() {
        assert_eq!(id_from_file_tag("x [DoubanID=123].mkv"), Some(123));
        assert_eq!(id_from_file_tag("x [douban-456]"), Some(456));
        assert_eq!(id_from_file_tag("x [douban=]"), None);
        assert_eq!(id_from_file_tag("x [tmdb=1] [douban=7]"), Some(7));
        assert_eq!(id_from_file_tag("no tag"), None);
    }

    #[test]
    fn personage_keys() {
        let mut ids = ProviderIds::new();
        ids.insert(PERSONAGE_ID_LEGACY.to_string(), "27228768".to_string());
        assert_eq!(personage_id_from_ids(&ids), Some(27228768));
    }

    #[test]
    fn ids_from_urls() {
        assert_eq!(
            personage_id_from_url("https://www.douban.com/personage/27228768/"),
            Some(27228768)
        );
        assert_eq!(
            celebrity_id_from_url("https://movie.douban.com/celebrity/1054395/"),
            Some(1054395)
        );
        assert_eq!(personage_id_from_url("https://movie.douban.com/celebrity/1/"), None);
    }

    #[test]
    fn episode_id_format() {
        assert_eq!(episode_provider_id("35196946", 3), "35196946/episode/3");
    }
}
