use douban_meta_core::{ImageKind, LookupQuery, PhotoCategory, RemoteImage};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{TitleResolver, ensure_active};
use crate::error::Result;

impl TitleResolver {
    /// Images of the subject matching `query`: the poster, then the poster,
    /// wallpaper and (when enabled) still photo categories. Duplicate URLs
    /// are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Cancelled` when `token` fires.
    pub async fn resolve_images(&self, query: &LookupQuery, token: &CancellationToken) -> Result<Vec<RemoteImage>> {
        let subject = self.resolve_subject(query, token).await?;
        if !subject.is_found() {
            return Ok(Vec::new());
        }

        let config = self.client.config();
        let cdn = config.cdn();
        let mut images = Vec::new();

        if let (Some(url), Some(id)) = (subject.poster_url(cdn), subject.poster_id.as_deref()) {
            images.push(RemoteImage {
                thumbnail_url: format!("{cdn}/view/photo/s/public/{id}.jpg"),
                url,
                width: 0,
                height: 0,
                kind: ImageKind::Primary,
                likes: None,
            });
        }

        let mut categories = vec![PhotoCategory::Poster, PhotoCategory::Wallpaper];
        if config.fetch_stage_photos {
            categories.push(PhotoCategory::Still);
        }
        for category in categories {
            ensure_active(token)?;
            for image in self.client.fetch_images(&subject.sid, category, token).await? {
                if !images.iter().any(|known: &RemoteImage| known.url == image.url) {
                    images.push(image);
                }
            }
        }

        debug!(sid = %subject.sid, count = images.len(), "collected images");
        Ok(images)
    }

    /// Portrait of the person matching `query`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Cancelled` when `token` fires.
    pub async fn resolve_person_images(
        &self,
        query: &LookupQuery,
        token: &CancellationToken,
    ) -> Result<Vec<RemoteImage>> {
        let person = self.resolve_person(query, token).await?;
        Ok(person
            .poster_url
            .filter(|url| !url.is_empty())
            .map(|url| RemoteImage {
                thumbnail_url: url.clone(),
                url,
                width: 0,
                height: 0,
                kind: ImageKind::Primary,
                likes: None,
            })
            .into_iter()
            .collect())
    }
}
