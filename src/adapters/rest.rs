use crate::adapters::http::{BackendClient, ErrorDetails};
use crate::domain::model::{Listing, ListingId, ListingPatch, ListingQuery, NewListing, Session};
use crate::domain::ports::ListingStore;
use crate::utils::error::{Result, RoomError};
use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};

const RETURN_REPRESENTATION: (&str, &str) = ("Prefer", "return=representation");

/// Listing table behind a PostgREST endpoint (`/rest/v1/{table}`).
#[derive(Clone)]
pub struct RestListingStore {
    client: BackendClient,
    table: String,
}

impl RestListingStore {
    pub fn new(client: BackendClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    fn path(&self) -> String {
        format!("rest/v1/{}", self.table)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
        target: &str,
    ) -> Result<Vec<Listing>> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("Error reaching listing store ({}): {}", action, e);
            RoomError::storage_unavailable(e.to_string())
        })?;
        tracing::debug!("Listing store {} -> {}", action, response.status());

        let response = check_status(response, action, target).await?;
        response.json::<Vec<Listing>>().await.map_err(|e| {
            tracing::error!("Unreadable listing store response ({}): {}", action, e);
            RoomError::storage_unavailable(format!("unreadable {} response: {}", action, e))
        })
    }
}

async fn check_status(response: Response, action: &str, target: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let details = ErrorDetails::from_response(response).await;
    tracing::error!(
        "Listing store rejected {} ({}): {} [{:?}]",
        action,
        details.status,
        details.message,
        details.code
    );

    Err(match details.status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RoomError::forbidden(action, target),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            RoomError::validation("listing", details.message)
        }
        status => RoomError::storage_unavailable(format!("{}: {}", status, details.message)),
    })
}

/// Strips PostgREST/LIKE wildcards so user text is matched literally.
fn like_pattern(text: &str) -> Option<String> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, '*' | '%'))
        .collect();
    (!cleaned.is_empty()).then(|| format!("ilike.*{}*", cleaned))
}

#[async_trait]
impl ListingStore for RestListingStore {
    async fn select(&self, query: &ListingQuery, session: Option<&Session>) -> Result<Vec<Listing>> {
        let mut request = self
            .client
            .request(Method::GET, &self.path(), session)
            .query(&[("select", "*"), ("order", "created_at.desc")]);

        if let Some(owner_id) = query.owner_id {
            request = request.query(&[("owner_id", format!("eq.{}", owner_id))]);
        }
        if let Some(pattern) = query.location.as_deref().and_then(like_pattern) {
            request = request.query(&[("location", pattern)]);
        }
        if let Some(limit) = query.limit {
            request = request.query(&[("limit", limit.to_string())]);
        }

        self.send(request, "list", &self.table).await
    }

    async fn select_by_id(&self, id: ListingId, session: Option<&Session>) -> Result<Option<Listing>> {
        let request = self
            .client
            .request(Method::GET, &self.path(), session)
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))])
            .query(&[("limit", "1")]);

        let rows = self.send(request, "read", &id.to_string()).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, row: &NewListing, session: &Session) -> Result<Listing> {
        let request = self
            .client
            .request(Method::POST, &self.path(), Some(session))
            .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
            .json(&[row]);

        self.send(request, "create", &self.table)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RoomError::storage_unavailable("insert returned no row"))
    }

    async fn update(&self, id: ListingId, patch: &ListingPatch, session: &Session) -> Result<Option<Listing>> {
        let request = self
            .client
            .request(Method::PATCH, &self.path(), Some(session))
            .query(&[("id", format!("eq.{}", id))])
            .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
            .json(patch);

        let rows = self.send(request, "update", &id.to_string()).await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, id: ListingId, session: &Session) -> Result<bool> {
        let request = self
            .client
            .request(Method::DELETE, &self.path(), Some(session))
            .query(&[("id", format!("eq.{}", id))])
            .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1);

        let rows = self.send(request, "delete", &id.to_string()).await?;
        Ok(!rows.is_empty())
    }
}
