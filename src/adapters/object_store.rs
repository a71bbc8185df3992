use crate::adapters::http::{BackendClient, ErrorDetails};
use crate::domain::model::Session;
use crate::domain::ports::ObjectStore;
use crate::utils::error::{Result, RoomError};
use async_trait::async_trait;
use reqwest::Method;

/// Bucket in the backend's storage API (`/storage/v1/object/{bucket}/{key}`).
#[derive(Clone)]
pub struct HttpObjectStore {
    client: BackendClient,
    bucket: String,
    cache_control_seconds: u64,
}

impl HttpObjectStore {
    pub fn new(client: BackendClient, bucket: impl Into<String>, cache_control_seconds: u64) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            cache_control_seconds,
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        session: Option<&Session>,
    ) -> Result<()> {
        let path = format!("storage/v1/object/{}/{}", self.bucket, key);
        let response = self
            .client
            .request(Method::POST, &path, session)
            .header("Content-Type", content_type)
            .header("cache-control", format!("max-age={}", self.cache_control_seconds))
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|e| RoomError::upload(key, e.to_string()))?;

        if response.status().is_success() {
            return Ok(());
        }

        let details = ErrorDetails::from_response(response).await;
        tracing::error!(
            "Object store rejected {} ({}): {}",
            key,
            details.status,
            details.message
        );
        Err(RoomError::upload(
            key,
            format!("{} ({})", details.message, details.status),
        ))
    }

    fn public_url(&self, key: &str) -> String {
        self.client
            .url(&format!("storage/v1/object/public/{}/{}", self.bucket, key))
    }
}
