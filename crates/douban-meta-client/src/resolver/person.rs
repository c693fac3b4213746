use douban_meta_core::ids::{personage_id_from_ids, subject_id_from_ids};
use douban_meta_core::{LookupQuery, PersonSubject};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{TitleResolver, ensure_active};
use crate::error::Result;

impl TitleResolver {
    /// Personage id of a person query.
    ///
    /// A stored personage id wins. Otherwise a stored celebrity id (kept
    /// under the subject id keys) is converted through the celebrity page
    /// redirect.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Cancelled` when `token` fires.
    pub async fn resolve_personage_id(&self, query: &LookupQuery, token: &CancellationToken) -> Result<Option<String>> {
        ensure_active(token)?;

        if let Some(pid) = personage_id_from_ids(&query.provider_ids) {
            return Ok(Some(pid.to_string()));
        }
        let Some(cid) = subject_id_from_ids(&query.provider_ids) else {
            return Ok(None);
        };
        self.client
            .convert_celebrity_id_to_personage_id(&cid.to_string(), token)
            .await
    }

    /// People matching a person query.
    ///
    /// A resolvable id yields that person alone. Otherwise the person
    /// search page is used, then the suggest endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Cancelled` when `token` fires.
    pub async fn search_person_results(
        &self,
        query: &LookupQuery,
        token: &CancellationToken,
    ) -> Result<Vec<PersonSubject>> {
        if let Some(pid) = self.resolve_personage_id(query, token).await? {
            let person = self.client.fetch_person_by_personage_id(&pid, token).await?;
            if person.is_found() {
                return Ok(vec![person]);
            }
        }

        let people = self.client.search_person(&query.name, token).await?;
        if !people.is_empty() {
            return Ok(people);
        }
        debug!(name = %query.name, "person search empty, trying suggest");
        self.client.suggest_person(&query.name, token).await
    }

    /// Detail record of a person; the not-found sentinel otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Cancelled` when `token` fires.
    pub async fn resolve_person(&self, query: &LookupQuery, token: &CancellationToken) -> Result<PersonSubject> {
        let pid = match self.resolve_personage_id(query, token).await? {
            Some(pid) => Some(pid),
            None => self
                .client
                .search_person(&query.name, token)
                .await?
                .into_iter()
                .find_map(|person| person.personage_id),
        };
        let Some(pid) = pid else {
            debug!(name = %query.name, "no person match");
            return Ok(PersonSubject::default());
        };

        let person = self.client.fetch_person_by_personage_id(&pid, token).await?;
        if person.is_found() {
            info!(pid = %pid, name = %person.name, "resolved person");
        }
        Ok(person)
    }
}
