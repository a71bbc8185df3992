use crate::adapters::{
    BackendClient, HttpIdentityProvider, HttpObjectStore, LocalStorage, RestListingStore,
};
use crate::core::auth::AuthService;
use crate::core::repository::ListingRepository;
use crate::core::service::ListingService;
use crate::core::session::SessionStore;
use crate::core::uploader::ImageUploader;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use std::sync::Arc;

/// Services wired against the hosted backend, sharing one session store.
pub struct App {
    pub sessions: Arc<SessionStore>,
    pub auth: AuthService<HttpIdentityProvider, LocalStorage>,
    pub listings: ListingService<RestListingStore, HttpObjectStore>,
}

impl App {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = BackendClient::from_config(config)?;
        let sessions = SessionStore::new();

        let auth = AuthService::new(
            HttpIdentityProvider::new(client.clone()),
            LocalStorage::new(config.session_dir().to_string()),
            config.session_file().to_string(),
            sessions.clone(),
        );

        let listings = ListingService::new(
            ListingRepository::new(RestListingStore::new(
                client.clone(),
                config.listings_table(),
            )),
            ImageUploader::new(HttpObjectStore::new(
                client,
                config.image_bucket(),
                config.cache_control_seconds(),
            )),
            sessions.clone(),
        );

        tracing::debug!(
            "Backend {} (table '{}', bucket '{}')",
            config.backend_url(),
            config.listings_table(),
            config.image_bucket()
        );

        Ok(Self {
            sessions,
            auth,
            listings,
        })
    }
}
