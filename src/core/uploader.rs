use crate::domain::model::{ListingId, Session};
use crate::domain::ports::ObjectStore;
use crate::utils::error::{Result, RoomError};
use chrono::Utc;
use std::path::Path;
use uuid::Uuid;

/// Stores listing images in the object store and hands back their public URLs.
/// Attaching the URL to the listing is left to the caller.
pub struct ImageUploader<O: ObjectStore> {
    store: O,
}

impl<O: ObjectStore> ImageUploader<O> {
    pub fn new(store: O) -> Self {
        Self { store }
    }

    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        listing_id: ListingId,
        session: Option<&Session>,
    ) -> Result<String> {
        if bytes.is_empty() {
            return Err(RoomError::upload(file_name, "file is empty"));
        }

        let key = storage_key(listing_id, file_name);
        let content_type = content_type_for(file_name);
        let size = bytes.len();

        tracing::debug!("📤 Uploading {} ({} bytes, {}) as {}", file_name, size, content_type, key);
        self.store
            .put_object(&key, bytes, content_type, session)
            .await
            .map_err(|e| match e {
                RoomError::UploadError { message, .. } => RoomError::upload(file_name, message),
                other => RoomError::upload(file_name, other.to_string()),
            })?;

        let url = self.store.public_url(&key);
        tracing::info!("📤 Uploaded {} for listing {}", file_name, listing_id);
        Ok(url)
    }
}

/// `{listing}-{unix millis}-{8 hex}.{ext}`; the random suffix keeps uploads within the
/// same millisecond apart.
pub fn storage_key(listing_id: ListingId, file_name: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    let base = format!("{}-{}-{}", listing_id, millis, &suffix[..8]);

    match extension(file_name) {
        Some(ext) => format!("{}.{}", base, ext),
        None => base,
    }
}

fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
}

pub fn content_type_for(file_name: &str) -> &'static str {
    match extension(file_name).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("heic") => "image/heic",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
