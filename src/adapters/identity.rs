use crate::adapters::http::{BackendClient, ErrorDetails};
use crate::domain::model::{Account, AccountId, Credentials, Session, SignUpOutcome};
use crate::domain::ports::IdentityProvider;
use crate::utils::error::{Result, RoomError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Method, Response};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserResponse,
}

/// Sign-up answers with a session when email confirmation is off, otherwise with the user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(UserResponse),
}

impl From<UserResponse> for Account {
    fn from(user: UserResponse) -> Self {
        Account {
            id: AccountId(user.id),
            email: user.email,
        }
    }
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));

        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            account: self.user.into(),
        }
    }
}

/// GoTrue-style identity API under `/auth/v1`.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: BackendClient,
}

impl HttpIdentityProvider {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

/// Transport and body-decode failures of the identity API, which carry no HTTP status.
fn provider_failure(action: &str, e: reqwest::Error) -> RoomError {
    tracing::error!("{} failed before a usable response: {}", action, e);
    RoomError::AuthError {
        message: format!("{} failed: {}", action, e),
        status: e.status().map(|status| status.as_u16()),
        code: None,
    }
}

async fn check_status(response: Response, action: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let details = ErrorDetails::from_response(response).await;
    tracing::error!(
        "{} error details: status={}, code={:?}, message={}",
        action,
        details.status,
        details.code,
        details.message
    );
    Err(RoomError::AuthError {
        message: details.message,
        status: Some(details.status.as_u16()),
        code: details.code,
    })
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome> {
        let response = self
            .client
            .request(Method::POST, "auth/v1/signup", None)
            .json(credentials)
            .send()
            .await
            .map_err(|e| provider_failure("Sign up", e))?;
        let response = check_status(response, "Sign up").await?;

        let body = response
            .json::<SignUpResponse>()
            .await
            .map_err(|e| provider_failure("Sign up", e))?;
        Ok(match body {
            SignUpResponse::Session(token) => {
                let session = token.into_session(Utc::now());
                SignUpOutcome {
                    account: session.account.clone(),
                    session: Some(session),
                }
            }
            SignUpResponse::User(user) => SignUpOutcome {
                account: user.into(),
                session: None,
            },
        })
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session> {
        let response = self
            .client
            .request(Method::POST, "auth/v1/token", None)
            .query(&[("grant_type", "password")])
            .json(credentials)
            .send()
            .await
            .map_err(|e| provider_failure("Sign in", e))?;
        let response = check_status(response, "Sign in").await?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| provider_failure("Sign in", e))?;
        Ok(token.into_session(Utc::now()))
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        let response = self
            .client
            .request(Method::POST, "auth/v1/logout", Some(session))
            .send()
            .await
            .map_err(|e| provider_failure("Sign out", e))?;
        check_status(response, "Sign out").await?;
        Ok(())
    }

    async fn current_account(&self, session: &Session) -> Result<Account> {
        let response = self
            .client
            .request(Method::GET, "auth/v1/user", Some(session))
            .send()
            .await
            .map_err(|e| provider_failure("Get user", e))?;
        let response = check_status(response, "Get user").await?;

        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| provider_failure("Get user", e))?;
        Ok(user.into())
    }
}
