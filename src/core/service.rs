use crate::core::filter::{filter, Criteria};
use crate::core::repository::ListingRepository;
use crate::core::session::SessionStore;
use crate::core::uploader::ImageUploader;
use crate::domain::model::{
    ImageFile, Listing, ListingDraft, ListingId, ListingPatch, ListingQuery, Session,
};
use crate::domain::ports::{ListingStore, ObjectStore};
use crate::utils::error::{Result, RoomError};
use crate::utils::validation::Validate;
use std::sync::Arc;

/// The listing workflows used by the front end: browsing, and the add/edit/delete
/// flows that combine the repository with image uploads.
pub struct ListingService<L: ListingStore, O: ObjectStore> {
    repository: ListingRepository<L>,
    uploader: ImageUploader<O>,
    sessions: Arc<SessionStore>,
}

impl<L: ListingStore, O: ObjectStore> ListingService<L, O> {
    pub fn new(
        repository: ListingRepository<L>,
        uploader: ImageUploader<O>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            repository,
            uploader,
            sessions,
        }
    }

    pub async fn browse(
        &self,
        server_filter: &ListingQuery,
        query: &str,
        criteria: &Criteria,
    ) -> Result<Vec<Listing>> {
        let session = self.sessions.current();
        let listings = self.repository.list(server_filter, session.as_ref()).await?;
        let total = listings.len();
        let matched: Vec<Listing> = filter(&listings, query, criteria)
            .into_iter()
            .cloned()
            .collect();
        tracing::debug!("🔍 '{}' matched {} of {} listings", query, matched.len(), total);
        Ok(matched)
    }

    pub async fn listing(&self, id: ListingId) -> Result<Listing> {
        let session = self.sessions.current();
        self.repository.get(id, session.as_ref()).await
    }

    pub async fn my_listings(&self) -> Result<Vec<Listing>> {
        let session = self.sessions.require()?;
        self.repository.my_listings(&session).await
    }

    /// Creates the record, then uploads `images` one by one and attaches their URLs.
    ///
    /// A failed upload aborts the flow: objects already stored stay in the bucket and
    /// the record keeps the image list it was created with.
    pub async fn create_listing(&self, draft: ListingDraft, images: Vec<ImageFile>) -> Result<Listing> {
        let session = self.sessions.require()?;
        let mut listing = self.repository.create(&session, draft).await?;

        if images.is_empty() {
            return Ok(listing);
        }

        let uploaded = self.upload_all(&session, listing.id, images).await?;
        let mut all_images = listing.images.clone();
        all_images.extend(uploaded);

        let patch = ListingPatch::images(all_images);
        self.repository.update(&session, listing.id, &patch).await?;
        patch.apply_to(&mut listing);
        Ok(listing)
    }

    /// Applies `patch`, detaches the URLs in `remove` and appends the URLs of `images`
    /// after the current (or patched) image list, all in one update.
    ///
    /// Ownership and the removals are checked before anything is uploaded, and nothing
    /// is written until every upload succeeded, so a failed submission leaves the stored
    /// listing as it was.
    pub async fn edit_listing(
        &self,
        id: ListingId,
        mut patch: ListingPatch,
        remove: &[String],
        images: Vec<ImageFile>,
    ) -> Result<Listing> {
        let session = self.sessions.require()?;
        patch.validate()?;
        let mut listing = self.repository.owned(&session, id, "update").await?;

        if !remove.is_empty() || !images.is_empty() {
            let mut all_images = patch.images.take().unwrap_or_else(|| listing.images.clone());
            for url in remove {
                detach(&mut all_images, url)?;
            }
            all_images.extend(self.upload_all(&session, id, images).await?);
            patch.images = Some(all_images);
        }

        self.repository.update(&session, id, &patch).await?;
        patch.apply_to(&mut listing);
        Ok(listing)
    }

    /// Detaches one image URL; the stored object itself is left alone.
    pub async fn remove_image(&self, id: ListingId, url: &str) -> Result<Listing> {
        let session = self.sessions.require()?;
        let mut listing = self.repository.owned(&session, id, "update").await?;

        let mut remaining = listing.images.clone();
        detach(&mut remaining, url)?;
        let patch = ListingPatch::images(remaining);
        self.repository.update(&session, id, &patch).await?;
        patch.apply_to(&mut listing);
        Ok(listing)
    }

    pub async fn delete_listing(&self, id: ListingId) -> Result<()> {
        let session = self.sessions.require()?;
        self.repository.delete(&session, id).await
    }

    async fn upload_all(
        &self,
        session: &Session,
        listing_id: ListingId,
        images: Vec<ImageFile>,
    ) -> Result<Vec<String>> {
        let count = images.len();
        let mut urls = Vec::with_capacity(count);

        for (index, image) in images.into_iter().enumerate() {
            tracing::debug!("📤 Image {}/{} for listing {}", index + 1, count, listing_id);
            let url = self
                .uploader
                .upload(image.bytes, &image.file_name, listing_id, Some(session))
                .await
                .inspect_err(|e| {
                    tracing::error!(
                        "Upload {}/{} for listing {} failed after {} succeeded: {}",
                        index + 1,
                        count,
                        listing_id,
                        urls.len(),
                        e
                    );
                })?;
            urls.push(url);
        }

        Ok(urls)
    }
}

fn detach(images: &mut Vec<String>, url: &str) -> Result<()> {
    let Some(position) = images.iter().position(|image| image == url) else {
        return Err(RoomError::validation(
            "images",
            format!("'{}' is not attached to this listing", url),
        ));
    };
    images.remove(position);
    Ok(())
}
