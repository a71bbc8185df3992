//! In-process backends for tests and offline demos. They keep the same contracts as
//! the HTTP adapters but do no access control of their own.

use crate::domain::model::{
    Account, AccountId, Credentials, Listing, ListingId, ListingPatch, ListingQuery, NewListing,
    Session, SignUpOutcome,
};
use crate::domain::ports::{IdentityProvider, ListingStore, ObjectStore};
use crate::utils::error::{Result, RoomError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct ListingRows {
    rows: Vec<Listing>,
    last_created: Option<DateTime<Utc>>,
    unavailable: bool,
}

#[derive(Clone, Default)]
pub struct MemoryListingStore {
    inner: Arc<Mutex<ListingRows>>,
}

impl MemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Makes every call fail with `StorageUnavailable` until switched back.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().await.unavailable = unavailable;
    }

    fn check_available(rows: &ListingRows) -> Result<()> {
        if rows.unavailable {
            return Err(RoomError::storage_unavailable("in-memory store is offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl ListingStore for MemoryListingStore {
    async fn select(&self, query: &ListingQuery, _session: Option<&Session>) -> Result<Vec<Listing>> {
        let rows = self.inner.lock().await;
        Self::check_available(&rows)?;

        let location = query.location.as_ref().map(|l| l.to_lowercase());
        let mut found: Vec<Listing> = rows
            .rows
            .iter()
            .filter(|l| query.owner_id.is_none_or(|owner| l.owner_id == owner))
            .filter(|l| {
                location
                    .as_ref()
                    .is_none_or(|needle| l.location.to_lowercase().contains(needle))
            })
            .cloned()
            .collect();

        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = query.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn select_by_id(&self, id: ListingId, _session: Option<&Session>) -> Result<Option<Listing>> {
        let rows = self.inner.lock().await;
        Self::check_available(&rows)?;
        Ok(rows.rows.iter().find(|l| l.id == id).cloned())
    }

    async fn insert(&self, row: &NewListing, _session: &Session) -> Result<Listing> {
        let mut rows = self.inner.lock().await;
        Self::check_available(&rows)?;

        // 保持 created_at 嚴格遞增，排序才穩定
        let mut created_at = Utc::now();
        if let Some(last) = rows.last_created {
            if created_at <= last {
                created_at = last + Duration::microseconds(1);
            }
        }
        rows.last_created = Some(created_at);

        let draft = row.draft.clone();
        let listing = Listing {
            id: ListingId(Uuid::new_v4()),
            title: draft.title,
            description: draft.description,
            location: draft.location,
            rent: draft.rent,
            property_type: draft.property_type,
            tenant_preference: draft.tenant_preference,
            contact_number: draft.contact_number,
            images: draft.images,
            owner_id: row.owner_id,
            created_at,
        };
        rows.rows.push(listing.clone());
        Ok(listing)
    }

    async fn update(&self, id: ListingId, patch: &ListingPatch, _session: &Session) -> Result<Option<Listing>> {
        let mut rows = self.inner.lock().await;
        Self::check_available(&rows)?;

        Ok(rows.rows.iter_mut().find(|l| l.id == id).map(|listing| {
            patch.apply_to(listing);
            listing.clone()
        }))
    }

    async fn delete(&self, id: ListingId, _session: &Session) -> Result<bool> {
        let mut rows = self.inner.lock().await;
        Self::check_available(&rows)?;

        let before = rows.rows.len();
        rows.rows.retain(|l| l.id != id);
        Ok(rows.rows.len() < before)
    }
}

#[derive(Default)]
struct Objects {
    keys: Vec<String>,
    objects: HashMap<String, (Vec<u8>, String)>,
    accept_remaining: Option<usize>,
    rejection: Option<String>,
}

#[derive(Clone)]
pub struct MemoryObjectStore {
    public_base: String,
    inner: Arc<Mutex<Objects>>,
}

impl MemoryObjectStore {
    pub fn new(public_base: impl Into<String>) -> Self {
        Self {
            public_base: public_base.into(),
            inner: Arc::new(Mutex::new(Objects::default())),
        }
    }

    /// Keys in upload order.
    pub async fn keys(&self) -> Vec<String> {
        self.inner.lock().await.keys.clone()
    }

    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.inner
            .lock()
            .await
            .objects
            .get(key)
            .map(|(_, content_type)| content_type.clone())
    }

    pub async fn reject_uploads(&self, message: &str) {
        self.reject_after(0, message).await;
    }

    /// Accepts `accepted` more uploads, then rejects with `message`.
    pub async fn reject_after(&self, accepted: usize, message: &str) {
        let mut objects = self.inner.lock().await;
        objects.accept_remaining = Some(accepted);
        objects.rejection = Some(message.to_string());
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        _session: Option<&Session>,
    ) -> Result<()> {
        let mut objects = self.inner.lock().await;

        if let Some(remaining) = objects.accept_remaining {
            if remaining == 0 {
                let message = objects
                    .rejection
                    .clone()
                    .unwrap_or_else(|| "upload rejected".to_string());
                return Err(RoomError::upload(key, message));
            }
            objects.accept_remaining = Some(remaining - 1);
        }

        if objects.objects.contains_key(key) {
            return Err(RoomError::upload(key, "The resource already exists"));
        }
        objects
            .objects
            .insert(key.to_string(), (bytes, content_type.to_string()));
        objects.keys.push(key.to_string());
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base.trim_end_matches('/'), key)
    }
}

#[derive(Default)]
struct Identities {
    accounts: HashMap<String, (String, Account)>,
    tokens: HashMap<String, AccountId>,
}

#[derive(Clone, Default)]
pub struct MemoryIdentityProvider {
    inner: Arc<Mutex<Identities>>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, email: &str, password: &str) -> Account {
        let account = Account {
            id: AccountId(Uuid::new_v4()),
            email: Some(email.to_string()),
        };
        self.inner
            .lock()
            .await
            .accounts
            .insert(email.to_string(), (password.to_string(), account.clone()));
        account
    }

    fn issue(identities: &mut Identities, account: &Account) -> Session {
        let token = Uuid::new_v4().simple().to_string();
        identities.tokens.insert(token.clone(), account.id);
        Session {
            access_token: token,
            refresh_token: None,
            expires_at: Some(Utc::now() + Duration::hours(1)),
            account: account.clone(),
        }
    }

    fn auth_error(status: u16, code: &str, message: &str) -> RoomError {
        RoomError::AuthError {
            message: message.to_string(),
            status: Some(status),
            code: Some(code.to_string()),
        }
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome> {
        let mut identities = self.inner.lock().await;
        if identities.accounts.contains_key(&credentials.email) {
            return Err(Self::auth_error(422, "user_already_exists", "User already registered"));
        }

        let account = Account {
            id: AccountId(Uuid::new_v4()),
            email: Some(credentials.email.clone()),
        };
        identities.accounts.insert(
            credentials.email.clone(),
            (credentials.password.clone(), account.clone()),
        );
        let session = Self::issue(&mut identities, &account);
        Ok(SignUpOutcome {
            account,
            session: Some(session),
        })
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session> {
        let mut identities = self.inner.lock().await;
        let account = match identities.accounts.get(&credentials.email) {
            Some((password, account)) if *password == credentials.password => account.clone(),
            _ => {
                return Err(Self::auth_error(400, "invalid_credentials", "Invalid login credentials"))
            }
        };
        Ok(Self::issue(&mut identities, &account))
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        self.inner.lock().await.tokens.remove(&session.access_token);
        Ok(())
    }

    async fn current_account(&self, session: &Session) -> Result<Account> {
        let identities = self.inner.lock().await;
        let id = identities
            .tokens
            .get(&session.access_token)
            .copied()
            .ok_or_else(|| Self::auth_error(401, "bad_jwt", "invalid JWT"))?;

        identities
            .accounts
            .values()
            .map(|(_, account)| account)
            .find(|account| account.id == id)
            .cloned()
            .ok_or_else(|| Self::auth_error(404, "user_not_found", "User not found"))
    }
}
