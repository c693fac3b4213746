use scraper::{CaseSensitivity, ElementRef, Html};
use serde::{Deserialize, Serialize};

use super::{ResponseParser, attr_of, select_doc, select_first, text_of};
use crate::types::{MovieSubject, PersonSubject, SubjectType};

const ORIGINAL_NAME_PREFIX: &str = "原名:";

/// What a subject search is looking for. Drives result ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchIntent {
    /// The text sent to the search endpoint.
    pub keyword: String,
    /// Prefer `电影` entries over `电视剧` entries.
    pub is_movie: bool,
    /// Promote base-title entries when the top hit is a later season.
    pub is_first_season: bool,
}

impl SearchIntent {
    pub fn movie(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            is_movie: true,
            is_first_season: false,
        }
    }

    pub fn series(keyword: impl Into<String>, is_first_season: bool) -> Self {
        Self {
            keyword: keyword.into(),
            is_movie: false,
            is_first_season,
        }
    }

    fn preferred_type(&self) -> SubjectType {
        if self.is_movie { SubjectType::Movie } else { SubjectType::Series }
    }
}

/// Raw fields shared by subject and person search entries.
struct SearchEntry<'a> {
    sid: String,
    name: String,
    image_src: Option<&'a str>,
    type_tag: String,
    element: ElementRef<'a>,
}

impl ResponseParser {
    /// Parses a subject search page (`cat=1002`).
    ///
    /// Entries whose type tag matches the intent come first; the sort is
    /// stable, so catalog order is kept within each group. For first-season
    /// series searches whose top hit is not the keyword itself, entries
    /// whose name is a strict prefix of the top name move to the front.
    pub fn parse_search_results(&self, html: &str, intent: &SearchIntent) -> Vec<MovieSubject> {
        let document = Html::parse_document(html);
        let mut results: Vec<MovieSubject> = self
            .search_entries(&document)
            .into_iter()
            .map(|entry| self.search_subject(entry))
            .collect();

        let preferred = intent.preferred_type();
        results.sort_by_key(|subject| subject.subject_type != preferred);

        if !intent.is_movie && intent.is_first_season {
            if let Some(first) = results.first().map(|s| s.name.clone()) {
                if first != intent.keyword {
                    results.sort_by_key(|s| {
                        !(!s.name.is_empty() && s.name != first && first.starts_with(&s.name))
                    });
                }
            }
        }

        tracing::debug!(keyword = %intent.keyword, count = results.len(), "parsed search results");
        results
    }

    /// Parses a person search page (`cat=1065`). The entry id is a personage id.
    pub fn parse_search_person_results(&self, html: &str) -> Vec<PersonSubject> {
        let document = Html::parse_document(html);
        self.search_entries(&document)
            .into_iter()
            .map(|entry| PersonSubject {
                personage_id: Some(entry.sid),
                name: entry.name,
                poster_url: entry.image_src.map(str::to_string),
                ..PersonSubject::default()
            })
            .collect()
    }

    fn search_entries<'a>(&self, document: &'a Html) -> Vec<SearchEntry<'a>> {
        let Some(list) = select_doc(document, &self.sel.result_list) else {
            return Vec::new();
        };

        list.children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().has_class("result", CaseSensitivity::CaseSensitive))
            .filter_map(|el| {
                let link = select_first(el, &self.sel.result_link)?;
                let sid = self
                    .re_sid
                    .captures(attr_of(link, "onclick")?)
                    .map(|c| c[1].to_string())?;
                let type_tag = select_first(el, &self.sel.result_type)
                    .map(text_of)
                    .unwrap_or_default();
                Some(SearchEntry {
                    sid,
                    name: text_of(link),
                    image_src: select_first(el, &self.sel.result_poster).and_then(|img| attr_of(img, "src")),
                    type_tag: type_tag.trim_start_matches('[').trim_end_matches(']').to_string(),
                    element: el,
                })
            })
            .collect()
    }

    fn search_subject(&self, entry: SearchEntry<'_>) -> MovieSubject {
        let el = entry.element;
        let rating = select_first(el, &self.sel.result_rating)
            .map(text_of)
            .and_then(|r| r.parse::<f64>().ok())
            .unwrap_or(0.0);

        // Unrated subjects have no `.subject-cast` span.
        let cast = select_first(el, &self.sel.result_cast)
            .or_else(|| select_first(el, &self.sel.result_rating_info))
            .map(text_of);

        let (original_name, year) = match cast {
            Some(cast) => {
                let parts: Vec<&str> = cast.split('/').map(str::trim).collect();
                let original_name = parts.first().and_then(|first| {
                    let (_, name) = first.split_once(ORIGINAL_NAME_PREFIX)?;
                    Some(name.trim().to_string()).filter(|n| !n.is_empty())
                });
                let year = parts.last().and_then(|y| y.parse::<u16>().ok());
                (original_name, year)
            }
            None => (None, None),
        };

        MovieSubject {
            sid: entry.sid,
            name: entry.name,
            original_name,
            subject_type: SubjectType::from_tag(&entry.type_tag),
            rating,
            poster_id: entry.image_src.and_then(|src| self.photo_id(src)),
            year,
            ..MovieSubject::default()
        }
    }
}
