use crate::core::session::{AuthEvent, SessionStore};
use crate::domain::model::{Account, Credentials, Session, SignUpOutcome};
use crate::domain::ports::{IdentityProvider, Storage};
use crate::utils::error::{Result, RoomError};
use crate::utils::validation::{validate_email, validate_required_text};
use chrono::Utc;
use std::sync::Arc;

/// Sign-up/sign-in/sign-out against the identity provider, keeping the
/// [`SessionStore`] and the persisted session file in step.
pub struct AuthService<I: IdentityProvider, S: Storage> {
    provider: I,
    storage: S,
    session_file: String,
    sessions: Arc<SessionStore>,
}

impl<I: IdentityProvider, S: Storage> AuthService<I, S> {
    pub fn new(provider: I, storage: S, session_file: String, sessions: Arc<SessionStore>) -> Self {
        Self {
            provider,
            storage,
            session_file,
            sessions,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// 載入已儲存的 session；過期或損毀的檔案會被移除
    pub async fn restore(&self) -> Result<Option<Session>> {
        let session = if self.storage.exists(&self.session_file).await {
            let data = self.storage.read_file(&self.session_file).await?;
            match serde_json::from_slice::<Session>(&data) {
                Ok(session) if session.is_expired_at(Utc::now()) => {
                    tracing::info!("Stored session expired, signing out locally");
                    self.storage.remove_file(&self.session_file).await?;
                    None
                }
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!("Discarding unreadable session file: {}", e);
                    self.storage.remove_file(&self.session_file).await?;
                    None
                }
            }
        } else {
            None
        };

        self.sessions
            .publish(AuthEvent::InitialSession, session.clone());
        Ok(session)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        let credentials = checked_credentials(email, password)?;
        let outcome = self.provider.sign_up(&credentials).await.inspect_err(|e| {
            tracing::error!("Sign up failed for {}: {}", credentials.email, e);
        })?;

        match &outcome.session {
            Some(session) => self.establish(session.clone()).await?,
            None => tracing::info!(
                "📧 Account {} created; email confirmation pending",
                outcome.account.id
            ),
        }
        Ok(outcome)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let credentials = checked_credentials(email, password)?;
        let session = self.provider.sign_in(&credentials).await.inspect_err(|e| {
            tracing::error!("Sign in failed for {}: {}", credentials.email, e);
        })?;

        self.establish(session.clone()).await?;
        Ok(session)
    }

    /// Clears local state even when the provider rejects the logout; that failure
    /// is still returned.
    pub async fn sign_out(&self) -> Result<()> {
        let Some(session) = self.sessions.current() else {
            tracing::debug!("Sign out requested without a session");
            return Ok(());
        };

        let remote = self.provider.sign_out(&session).await;
        if let Err(e) = &remote {
            tracing::error!("Error signing out: {}", e);
        }

        if self.storage.exists(&self.session_file).await {
            self.storage.remove_file(&self.session_file).await?;
        }
        self.sessions.publish(AuthEvent::SignedOut, None);
        tracing::info!("👋 Signed out {}", session.account_id());
        remote
    }

    pub async fn current_account(&self) -> Result<Account> {
        let session = self.sessions.require()?;
        self.provider.current_account(&session).await
    }

    async fn establish(&self, session: Session) -> Result<()> {
        let data = serde_json::to_vec_pretty(&session)?;
        self.storage.write_file(&self.session_file, &data).await?;
        tracing::info!("🔑 Signed in as {}", session.account_id());
        self.sessions.publish(AuthEvent::SignedIn, Some(session));
        Ok(())
    }
}

fn checked_credentials(email: &str, password: &str) -> Result<Credentials> {
    validate_email("email", email)?;
    validate_required_text("password", password)?;
    Ok(Credentials::new(email, password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::local::LocalStorage;
    use crate::adapters::memory::MemoryIdentityProvider;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn service(
        dir: &TempDir,
        provider: MemoryIdentityProvider,
    ) -> AuthService<MemoryIdentityProvider, LocalStorage> {
        let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());
        AuthService::new(provider, storage, "session.json".to_string(), SessionStore::new())
    }

    #[tokio::test]
    async fn test_sign_in_persists_and_publishes() {
        let dir = TempDir::new().unwrap();
        let provider = MemoryIdentityProvider::new();
        provider.register("owner@example.com", "hunter22").await;
        let auth = service(&dir, provider);

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let _subscription = auth
            .sessions()
            .subscribe(move |event, _| sink.lock().unwrap().push(event));

        let session = auth
            .sign_in(" owner@example.com ", "hunter22")
            .await
            .unwrap();

        assert_eq!(auth.sessions().current(), Some(session));
        assert!(dir.path().join("session.json").exists());
        assert_eq!(*events.lock().unwrap(), vec![AuthEvent::SignedIn]);
    }

    #[tokio::test]
    async fn test_sign_in_with_wrong_password_keeps_signed_out() {
        let dir = TempDir::new().unwrap();
        let provider = MemoryIdentityProvider::new();
        provider.register("owner@example.com", "hunter22").await;
        let auth = service(&dir, provider);

        let result = auth.sign_in("owner@example.com", "wrong").await;

        assert!(matches!(result, Err(RoomError::AuthError { .. })));
        assert!(auth.sessions().current().is_none());
        assert!(!dir.path().join("session.json").exists());
    }

    #[tokio::test]
    async fn test_sign_in_requires_valid_email() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir, MemoryIdentityProvider::new());
        let result = auth.sign_in("not-an-email", "hunter22").await;
        assert!(matches!(result, Err(RoomError::ValidationError { .. })));
    }

    #[tokio::test]
    async fn test_restore_round_trips_persisted_session() {
        let dir = TempDir::new().unwrap();
        let provider = MemoryIdentityProvider::new();
        provider.register("owner@example.com", "hunter22").await;
        let session = service(&dir, provider.clone())
            .sign_in("owner@example.com", "hunter22")
            .await
            .unwrap();

        let restored = service(&dir, provider).restore().await.unwrap();
        assert_eq!(restored, Some(session));
    }

    #[tokio::test]
    async fn test_restore_drops_expired_session() {
        let dir = TempDir::new().unwrap();
        let provider = MemoryIdentityProvider::new();
        let auth = service(&dir, provider);

        let expired = Session {
            access_token: "old".to_string(),
            refresh_token: None,
            expires_at: Some(Utc::now() - chrono::Duration::hours(1)),
            account: Account {
                id: crate::domain::model::AccountId(uuid::Uuid::new_v4()),
                email: None,
            },
        };
        std::fs::write(
            dir.path().join("session.json"),
            serde_json::to_vec(&expired).unwrap(),
        )
        .unwrap();

        assert_eq!(auth.restore().await.unwrap(), None);
        assert!(!dir.path().join("session.json").exists());
    }

    #[tokio::test]
    async fn test_sign_out_clears_local_state() {
        let dir = TempDir::new().unwrap();
        let provider = MemoryIdentityProvider::new();
        provider.register("owner@example.com", "hunter22").await;
        let auth = service(&dir, provider);
        auth.sign_in("owner@example.com", "hunter22").await.unwrap();

        auth.sign_out().await.unwrap();

        assert!(auth.sessions().current().is_none());
        assert!(!dir.path().join("session.json").exists());
        assert!(matches!(
            auth.current_account().await,
            Err(RoomError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_sign_up_with_immediate_session_signs_in() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir, MemoryIdentityProvider::new());

        let outcome = auth.sign_up("new@example.com", "hunter22").await.unwrap();

        assert!(outcome.session.is_some());
        assert_eq!(
            auth.current_account().await.unwrap().email.as_deref(),
            Some("new@example.com")
        );
    }
}
