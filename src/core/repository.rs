use crate::domain::model::{
    Listing, ListingDraft, ListingId, ListingPatch, ListingQuery, NewListing, Session,
};
use crate::domain::ports::ListingStore;
use crate::utils::error::{Result, RoomError};
use crate::utils::validation::Validate;

/// CRUD façade over the listings table. Validates input and enforces ownership
/// before anything reaches the store.
pub struct ListingRepository<S: ListingStore> {
    store: S,
}

impl<S: ListingStore> ListingRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        query: &ListingQuery,
        session: Option<&Session>,
    ) -> Result<Vec<Listing>> {
        let mut listings = self.store.select(query, session).await?;
        // 保證由新到舊，即使後端沒有依 created_at 排序
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tracing::debug!("Fetched {} listings ({:?})", listings.len(), query);
        Ok(listings)
    }

    pub async fn my_listings(&self, session: &Session) -> Result<Vec<Listing>> {
        self.list(&ListingQuery::owned_by(session.account_id()), Some(session))
            .await
    }

    pub async fn get(&self, id: ListingId, session: Option<&Session>) -> Result<Listing> {
        self.store
            .select_by_id(id, session)
            .await?
            .ok_or_else(|| RoomError::not_found(id))
    }

    pub async fn create(&self, session: &Session, draft: ListingDraft) -> Result<Listing> {
        draft.validate()?;

        let row = NewListing {
            draft,
            owner_id: session.account_id(),
        };
        let listing = self.store.insert(&row, session).await?;
        tracing::info!("🏠 Created listing {} for {}", listing.id, listing.owner_id);
        Ok(listing)
    }

    pub async fn update(&self, session: &Session, id: ListingId, patch: &ListingPatch) -> Result<()> {
        patch.validate()?;
        self.owned(session, id, "update").await?;

        if patch.is_empty() {
            tracing::debug!("Empty update for listing {}, nothing to send", id);
            return Ok(());
        }

        match self.store.update(id, patch, session).await? {
            Some(_) => {
                tracing::info!("✏️ Updated listing {}", id);
                Ok(())
            }
            // 讀取後被刪除
            None => Err(RoomError::not_found(id)),
        }
    }

    pub async fn delete(&self, session: &Session, id: ListingId) -> Result<()> {
        self.owned(session, id, "delete").await?;

        if self.store.delete(id, session).await? {
            tracing::info!("🗑️ Deleted listing {}", id);
            Ok(())
        } else {
            Err(RoomError::not_found(id))
        }
    }

    /// Loads the listing and checks that `session` owns it.
    pub async fn owned(&self, session: &Session, id: ListingId, action: &str) -> Result<Listing> {
        let listing = self.get(id, Some(session)).await?;
        if !listing.is_owned_by(session.account_id()) {
            tracing::warn!(
                "Account {} attempted to {} listing {} owned by {}",
                session.account_id(),
                action,
                id,
                listing.owner_id
            );
            return Err(RoomError::forbidden(action, id));
        }
        Ok(listing)
    }
}
