use crate::domain::model::{
    Account, Credentials, Listing, ListingId, ListingPatch, ListingQuery, NewListing, Session,
    SignUpOutcome,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Local file storage, used for session persistence.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn backend_url(&self) -> &str;
    fn anon_key(&self) -> &str;
    fn listings_table(&self) -> &str;
    fn image_bucket(&self) -> &str;
    fn cache_control_seconds(&self) -> u64;
    fn request_timeout_seconds(&self) -> u64;
    /// Directory holding the persisted session.
    fn session_dir(&self) -> &str;
    fn session_file(&self) -> &str;
}

/// Table-style access to the listings relation.
///
/// `session` carries the caller's token so the backend can apply its own row policies;
/// `None` means anonymous access.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Rows matching `query`, newest first.
    async fn select(&self, query: &ListingQuery, session: Option<&Session>)
        -> Result<Vec<Listing>>;
    async fn select_by_id(&self, id: ListingId, session: Option<&Session>)
        -> Result<Option<Listing>>;
    async fn insert(&self, row: &NewListing, session: &Session) -> Result<Listing>;
    /// Returns the updated row, or `None` when no row matched.
    async fn update(
        &self,
        id: ListingId,
        patch: &ListingPatch,
        session: &Session,
    ) -> Result<Option<Listing>>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: ListingId, session: &Session) -> Result<bool>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        session: Option<&Session>,
    ) -> Result<()>;
    fn public_url(&self, key: &str) -> String;
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome>;
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session>;
    async fn sign_out(&self, session: &Session) -> Result<()>;
    async fn current_account(&self, session: &Session) -> Result<Account>;
}
