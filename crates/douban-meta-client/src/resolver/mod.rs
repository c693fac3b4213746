//! Title resolution engine.
//!
//! Turns a loosely identified [`LookupQuery`] into catalog records:
//!
//! 1. a known provider id is fetched directly;
//! 2. otherwise an ordered list of candidate names is built
//!    ([`TitleResolver::candidate_names`]);
//! 3. candidates are searched in order, each followed by its cleaned and
//!    anime-title variants, until one search returns anything;
//! 4. first-season queries whose top hit names a later season are searched
//!    again with the season replaced by 1;
//! 5. subjects are projected into [`SearchResult`]s.
//!
//! Every stage degrades to "nothing found". Only cancellation is returned
//! as an error.

mod candidates;
mod images;
mod person;

use std::collections::HashSet;
use std::sync::Arc;

use douban_meta_core::ids::{episode_provider_id, subject_id_from_ids};
use douban_meta_core::{
    CastMember, EpisodeSubject, LookupKind, LookupQuery, MovieSubject, SearchIntent, SearchResult,
    SeasonOutcome, SeasonParser, resolve_provider_id,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::DoubanClient;
use crate::error::{ClientError, Result};

/// An episode together with the subject it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEpisode {
    pub subject: MovieSubject,
    pub index: u32,
    pub episode: EpisodeSubject,
    /// `{sid}/episode/{index}`, the id stored for the episode.
    pub provider_id: String,
}

/// Resolves lookup queries against one shared [`DoubanClient`].
///
/// Resolvers built on clones of the same `Arc<DoubanClient>` share its
/// cache and request cadence.
pub struct TitleResolver {
    client: Arc<DoubanClient>,
    seasons: SeasonParser,
}

impl TitleResolver {
    /// Builds a resolver using the client's trailing-number exclusions.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Core` if the season patterns fail to compile.
    pub fn new(client: Arc<DoubanClient>) -> Result<Self> {
        let seasons = SeasonParser::new(client.config().trailing_number_exclusions.iter().cloned())?;
        Ok(Self { client, seasons })
    }

    pub fn client(&self) -> &DoubanClient {
        &self.client
    }

    pub fn seasons(&self) -> &SeasonParser {
        &self.seasons
    }

    /// Search results for `query`, best match first.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Cancelled` when `token` fires.
    pub async fn search_results(&self, query: &LookupQuery, token: &CancellationToken) -> Result<Vec<SearchResult>> {
        ensure_active(token)?;
        let cdn = self.client.config().cdn();

        if let Some(subject) = self.direct_hit(query, token).await? {
            return Ok(vec![SearchResult::from_subject(&subject, cdn)]);
        }

        let subjects = self.search_subjects(query, token).await?;
        Ok(subjects
            .iter()
            .map(|subject| SearchResult::from_subject(subject, cdn))
            .collect())
    }

    /// Detail record of the best match; the not-found sentinel otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Cancelled` when `token` fires.
    pub async fn resolve_subject(&self, query: &LookupQuery, token: &CancellationToken) -> Result<MovieSubject> {
        ensure_active(token)?;

        if let Some(subject) = self.direct_hit(query, token).await? {
            return Ok(subject);
        }

        let Some(top) = self.search_subjects(query, token).await?.into_iter().next() else {
            debug!(kind = query.kind_name(), name = %query.name, "no match");
            return Ok(MovieSubject::default());
        };

        let subject = self.client.fetch_movie(&top.sid, token).await?;
        if subject.is_found() {
            info!(kind = query.kind_name(), name = %query.name, sid = %subject.sid, title = %subject.name, "resolved subject");
        }
        Ok(subject)
    }

    /// Resolves a season. Specials folders short-circuit without a lookup.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Cancelled` when `token` fires.
    pub async fn resolve_season(&self, query: &LookupQuery, token: &CancellationToken) -> Result<SeasonOutcome> {
        ensure_active(token)?;

        if let (true, Some(folder)) = self.seasons.is_specials_folder(query) {
            debug!(folder = %folder, "specials folder, skipping lookup");
            return Ok(SeasonOutcome::Specials { folder });
        }

        let subject = self.resolve_subject(query, token).await?;
        Ok(if subject.is_found() {
            SeasonOutcome::Matched(subject)
        } else {
            SeasonOutcome::NotFound
        })
    }

    /// Resolves an episode: the owning subject first, then its episode page.
    ///
    /// The episode number comes from the query hint or, failing that, from
    /// the file name.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Cancelled` when `token` fires.
    pub async fn resolve_episode(
        &self,
        query: &LookupQuery,
        token: &CancellationToken,
    ) -> Result<Option<ResolvedEpisode>> {
        ensure_active(token)?;

        let Some(index) = self.episode_index(query) else {
            debug!(name = %query.name, "episode number unknown");
            return Ok(None);
        };

        let subject = self.resolve_subject(query, token).await?;
        if !subject.is_found() {
            return Ok(None);
        }

        let Some(mut episode) = self.client.fetch_episode(&subject.sid, index, token).await? else {
            return Ok(None);
        };
        episode.name = episode.display_name(index, self.client.config().synthesize_episode_titles);
        Ok(Some(ResolvedEpisode {
            provider_id: episode_provider_id(&subject.sid, index),
            subject,
            index,
            episode,
        }))
    }

    /// Cast and crew of a resolved subject.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Cancelled` when `token` fires.
    pub async fn resolve_cast(&self, subject: &MovieSubject, token: &CancellationToken) -> Result<Vec<CastMember>> {
        ensure_active(token)?;
        if !subject.is_found() {
            return Ok(Vec::new());
        }
        self.client.fetch_celebrities(&subject.sid, token).await
    }

    /// Fetches the subject of a known provider id.
    async fn direct_hit(&self, query: &LookupQuery, token: &CancellationToken) -> Result<Option<MovieSubject>> {
        let Some(sid) = resolve_provider_id(query, false) else {
            return Ok(None);
        };

        let subject = self.client.fetch_movie(&sid.to_string(), token).await?;
        if subject.is_found() {
            info!(kind = query.kind_name(), sid = %subject.sid, title = %subject.name, "resolved by provider id");
            return Ok(Some(subject));
        }
        debug!(sid, "provider id did not resolve, falling back to search");
        Ok(None)
    }

    /// Steps 2 to 4 of the cascade.
    async fn search_subjects(&self, query: &LookupQuery, token: &CancellationToken) -> Result<Vec<MovieSubject>> {
        let parent = self.parent_series_name(query, token).await?;
        let candidates = self.candidate_names(query, parent.as_deref());
        debug!(kind = query.kind_name(), ?candidates, "candidate names");

        let first_season = self.wants_first_season(query);
        let mut tried = HashSet::new();

        for candidate in &candidates {
            for keyword in self.keyword_variants(query, candidate) {
                if !tried.insert(keyword.clone()) {
                    continue;
                }
                ensure_active(token)?;

                let intent = self.intent(query, keyword, first_season);
                let results = self.client.search_movie(&intent, token).await?;
                if !results.is_empty() {
                    return self.normalize_first_season(query, first_season, results, token).await;
                }
            }
        }

        debug!(kind = query.kind_name(), name = %query.name, "no candidate produced results");
        Ok(Vec::new())
    }

    /// Re-searches as season 1 when a first-season query's top hit names a
    /// later season.
    async fn normalize_first_season(
        &self,
        query: &LookupQuery,
        first_season: bool,
        results: Vec<MovieSubject>,
        token: &CancellationToken,
    ) -> Result<Vec<MovieSubject>> {
        if !first_season || !self.client.config().optimize_for_first_season {
            return Ok(results);
        }
        let Some(top) = results.first() else {
            return Ok(results);
        };
        let marker = self.seasons.parse_season_index(&top.name);
        if marker < 2 {
            return Ok(results);
        }

        if self.seasons.strip_season(&top.name).is_empty() {
            return Ok(results);
        }
        let keyword = self.seasons.replace_season_index_with(&top.name, 1);
        debug!(top = %top.name, retry = %keyword, "top hit is a later season, searching for season 1");

        ensure_active(token)?;
        let retried = self
            .client
            .search_movie(&self.intent(query, keyword, true), token)
            .await?;
        Ok(if retried.is_empty() { results } else { retried })
    }

    /// Display name of the parent series, fetched only for later seasons
    /// whose series id is known.
    async fn parent_series_name(&self, query: &LookupQuery, token: &CancellationToken) -> Result<Option<String>> {
        let LookupKind::Season { series_ids, .. } = &query.kind else {
            return Ok(None);
        };
        if self.wants_first_season(query) {
            return Ok(None);
        }
        let Some(sid) = subject_id_from_ids(series_ids) else {
            return Ok(None);
        };

        let parent = self.client.fetch_movie(&sid.to_string(), token).await?;
        Ok(Some(parent.name).filter(|name| !name.is_empty()))
    }

    /// Season number the query asks for: the host hint, else the guess.
    fn season_index(&self, query: &LookupQuery) -> u32 {
        query
            .season_hint()
            .filter(|index| *index > 0)
            .unwrap_or_else(|| self.seasons.guess_season_index(query))
    }

    /// Whether the query is after a first season.
    fn wants_first_season(&self, query: &LookupQuery) -> bool {
        match query.kind {
            LookupKind::Movie | LookupKind::Person => false,
            LookupKind::Series => self.seasons.parse_season_index(&query.name) < 2,
            LookupKind::Season { .. } | LookupKind::Episode { .. } => self.season_index(query) < 2,
        }
    }

    fn episode_index(&self, query: &LookupQuery) -> Option<u32> {
        query.episode_hint().filter(|index| *index > 0).or_else(|| {
            let file_name = query.file_name()?;
            self.seasons.file_names().parse(file_name).ok()?.episode
        })
    }

    fn intent(&self, query: &LookupQuery, keyword: String, first_season: bool) -> SearchIntent {
        if query.is_movie() {
            SearchIntent::movie(keyword)
        } else {
            SearchIntent::series(keyword, first_season)
        }
    }
}

fn ensure_active(token: &CancellationToken) -> Result<()> {
    if token.is_cancelled() {
        return Err(ClientError::Cancelled);
    }
    Ok(())
}
