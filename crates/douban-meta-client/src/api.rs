//! Catalog endpoints.
//!
//! Each operation fetches one page through the shared [`Fetcher`] and hands
//! it to the core [`ResponseParser`]. "No content" becomes an empty list or
//! the not-found sentinel.

use std::sync::Arc;

use douban_meta_core::ids::personage_id_from_url;
use douban_meta_core::{
    CastMember, EpisodeSubject, MovieSubject, PersonSubject, PhotoCategory, RemoteImage, ResponseParser,
    SearchIntent,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::fetcher::Fetcher;
use crate::transport::{ReqwestTransport, Transport};

/// Base URLs of the catalog. Overridable for tests and mirrors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub www: String,
    pub movie: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            www: "https://www.douban.com".to_string(),
            movie: "https://movie.douban.com".to_string(),
        }
    }
}

impl Endpoints {
    pub fn search(&self, keyword: &str) -> String {
        format!("{}/search?cat=1002&q={}", self.www, urlencoding::encode(keyword))
    }

    pub fn person_search(&self, keyword: &str) -> String {
        format!("{}/search?cat=1065&q={}", self.www, urlencoding::encode(keyword))
    }

    pub fn subject(&self, sid: &str) -> String {
        format!("{}/subject/{sid}/", self.movie)
    }

    pub fn celebrities(&self, sid: &str) -> String {
        format!("{}/subject/{sid}/celebrities", self.movie)
    }

    pub fn photos(&self, sid: &str, category: PhotoCategory) -> String {
        format!("{}/subject/{sid}/photos?type={}", self.movie, category.code())
    }

    pub fn episode(&self, sid: &str, index: u32) -> String {
        format!("{}/subject/{sid}/episode/{index}/", self.movie)
    }

    pub fn personage(&self, pid: &str) -> String {
        format!("{}/personage/{pid}/", self.www)
    }

    pub fn celebrity(&self, cid: &str) -> String {
        format!("{}/celebrity/{cid}/", self.movie)
    }

    pub fn suggest(&self, keyword: &str) -> String {
        format!("{}/j/subject_suggest?q={}", self.movie, urlencoding::encode(keyword))
    }
}

/// Catalog client. Cheap to share behind an `Arc`; all clones of that
/// `Arc` use one cache and one request cadence.
pub struct DoubanClient {
    config: ClientConfig,
    endpoints: Endpoints,
    fetcher: Fetcher,
    parser: ResponseParser,
}

impl DoubanClient {
    /// Builds a client that talks to the network.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` for invalid configuration values and
    /// `ClientError::Http` when the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Self::with_transport(config, transport)
    }

    /// Builds a client on top of any [`Transport`].
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` for invalid configuration values.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fetcher: Fetcher::new(transport, &config),
            parser: ResponseParser::new()?,
            endpoints: Endpoints::default(),
            config,
        })
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn parser(&self) -> &ResponseParser {
        &self.parser
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Free-text subject search.
    pub async fn search_movie(&self, intent: &SearchIntent, token: &CancellationToken) -> Result<Vec<MovieSubject>> {
        let keyword = intent.keyword.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }

        debug!(keyword = %keyword, "searching subjects");
        let Some(body) = self.fetcher.get(&self.endpoints.search(keyword), token).await? else {
            return Ok(Vec::new());
        };
        let results = self.parser.parse_search_results(&body, intent);
        match results.first() {
            Some(first) => debug!(keyword = %keyword, count = results.len(), first = %first.name, "search results"),
            None => debug!(keyword = %keyword, "no search results"),
        }
        Ok(results)
    }

    /// Subject detail page; the not-found sentinel when the page is missing.
    pub async fn fetch_movie(&self, sid: &str, token: &CancellationToken) -> Result<MovieSubject> {
        debug!(sid = %sid, "fetching subject");
        let Some(body) = self.fetcher.get(&self.endpoints.subject(sid), token).await? else {
            return Ok(MovieSubject::default());
        };
        Ok(self.parser.parse_movie(&body, sid))
    }

    pub async fn fetch_celebrities(&self, sid: &str, token: &CancellationToken) -> Result<Vec<CastMember>> {
        debug!(sid = %sid, "fetching cast");
        let Some(body) = self.fetcher.get(&self.endpoints.celebrities(sid), token).await? else {
            return Ok(Vec::new());
        };
        Ok(self.parser.parse_celebrities(&body, &self.config.image_options()))
    }

    /// First page of one photo category.
    pub async fn fetch_images(
        &self,
        sid: &str,
        category: PhotoCategory,
        token: &CancellationToken,
    ) -> Result<Vec<RemoteImage>> {
        debug!(sid = %sid, category = category.code(), "fetching photos");
        let Some(body) = self.fetcher.get(&self.endpoints.photos(sid, category), token).await? else {
            return Ok(Vec::new());
        };
        Ok(self
            .parser
            .parse_images(&body, category.default_kind(), &self.config.image_options()))
    }

    pub async fn fetch_episode(
        &self,
        sid: &str,
        index: u32,
        token: &CancellationToken,
    ) -> Result<Option<EpisodeSubject>> {
        debug!(sid = %sid, index, "fetching episode");
        let body = self.fetcher.get(&self.endpoints.episode(sid, index), token).await?;
        Ok(body.map(|body| self.parser.parse_episode(&body)))
    }

    /// Person search over the HTML search page. Ids are personage ids.
    pub async fn search_person(&self, keyword: &str, token: &CancellationToken) -> Result<Vec<PersonSubject>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }

        debug!(keyword = %keyword, "searching persons");
        let Some(body) = self.fetcher.get(&self.endpoints.person_search(keyword), token).await? else {
            return Ok(Vec::new());
        };
        Ok(self.parser.parse_search_person_results(&body))
    }

    /// Person search over the JSON suggest endpoint. Ids are celebrity ids.
    pub async fn suggest_person(&self, keyword: &str, token: &CancellationToken) -> Result<Vec<PersonSubject>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }

        let Some(body) = self.fetcher.get(&self.endpoints.suggest(keyword), token).await? else {
            return Ok(Vec::new());
        };
        match self.parser.parse_subject_suggest(&body) {
            Ok(people) => Ok(people),
            Err(e) => {
                warn!(keyword = %keyword, error = %e, "malformed suggest response");
                Ok(Vec::new())
            }
        }
    }

    pub async fn fetch_person_by_personage_id(&self, pid: &str, token: &CancellationToken) -> Result<PersonSubject> {
        debug!(pid = %pid, "fetching person");
        let Some(body) = self.fetcher.get(&self.endpoints.personage(pid), token).await? else {
            return Ok(PersonSubject::default());
        };
        Ok(self.parser.parse_person(&body, pid, self.config.cdn()))
    }

    /// Fetches a person known by celebrity id through its personage page.
    pub async fn fetch_person_by_celebrity_id(&self, cid: &str, token: &CancellationToken) -> Result<PersonSubject> {
        let Some(pid) = self.convert_celebrity_id_to_personage_id(cid, token).await? else {
            return Ok(PersonSubject::default());
        };
        let mut person = self.fetch_person_by_personage_id(&pid, token).await?;
        if person.is_found() {
            person.celebrity_id = Some(cid.to_string());
        }
        Ok(person)
    }

    /// Follows the celebrity page redirect and reads the personage id from
    /// the final URL.
    pub async fn convert_celebrity_id_to_personage_id(
        &self,
        cid: &str,
        token: &CancellationToken,
    ) -> Result<Option<String>> {
        let final_url = self
            .fetcher
            .resolve_redirect(&self.endpoints.celebrity(cid), token)
            .await?;
        let pid = final_url
            .as_deref()
            .and_then(personage_id_from_url)
            .map(|pid| pid.to_string());
        debug!(cid = %cid, pid = ?pid, "converted celebrity id");
        Ok(pid)
    }
}
