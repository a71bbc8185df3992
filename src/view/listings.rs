use crate::core::service::ListingService;
use crate::domain::model::{Listing, ListingId};
use crate::domain::ports::{ListingStore, ObjectStore};
use crate::utils::error::Result;

/// `listings` without the entry whose id is `id`.
pub fn without(listings: &[Listing], id: ListingId) -> Vec<Listing> {
    listings.iter().filter(|l| l.id != id).cloned().collect()
}

/// The front end's local copy of a listing list, e.g. "my listings".
#[derive(Debug, Clone, Default)]
pub struct ListingsView {
    listings: Vec<Listing>,
    error: Option<String>,
}

impl ListingsView {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            listings,
            error: None,
        }
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Deletes through the service; the local list only changes once that succeeded.
    pub async fn delete<L: ListingStore, O: ObjectStore>(
        &mut self,
        service: &ListingService<L, O>,
        id: ListingId,
    ) -> Result<()> {
        match service.delete_listing(id).await {
            Ok(()) => {
                self.listings = without(&self.listings, id);
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.error = Some(format!("Failed to delete the room: {}", e.user_friendly_message()));
                Err(e)
            }
        }
    }
}
