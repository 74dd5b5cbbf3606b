//! Image uploads through presigned URLs.
//!
//! The API hands out an upload URL and the public URL of the object; the bytes
//! go straight to the upload URL without the bearer token.

use crate::api::{notify_failure, ApiClient};
use crate::domain::error::{PawfeedError, Result};
use crate::domain::UploadTarget;
use crate::ui::Toasts;
use serde::Serialize;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// # Errors
///
/// Returns [`PawfeedError::Validation`] for non-image content types, empty
/// files, and files over [`MAX_UPLOAD_BYTES`].
pub fn validate_upload(content_type: &str, size: usize) -> Result<()> {
    if !content_type.starts_with("image/") {
        return Err(PawfeedError::Validation("Only images can be uploaded".to_string()));
    }
    if size == 0 {
        return Err(PawfeedError::Validation("The file is empty".to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(PawfeedError::Validation("Images can be at most 10 MB".to_string()));
    }
    Ok(())
}

#[derive(Serialize)]
struct PresignRequest<'a> {
    file_name: &'a str,
    content_type: &'a str,
    size: usize,
}

#[derive(Debug, Clone)]
pub struct UploadService {
    api: ApiClient,
    toasts: Toasts,
}

impl UploadService {
    #[must_use]
    pub fn new(api: ApiClient, toasts: Toasts) -> Self {
        Self { api, toasts }
    }

    /// Uploads an image and returns its public URL.
    ///
    /// # Errors
    ///
    /// Validation or API failures, also shown as a toast.
    pub async fn upload_image(&self, file_name: &str, content_type: &str, data: Vec<u8>) -> Result<String> {
        let result = self.try_upload(file_name, content_type, data).await;
        notify_failure(&self.toasts, "Could not upload image", result)
    }

    async fn try_upload(&self, file_name: &str, content_type: &str, data: Vec<u8>) -> Result<String> {
        validate_upload(content_type, data.len())?;

        let request = PresignRequest {
            file_name,
            content_type,
            size: data.len(),
        };
        let target: UploadTarget = self.api.post("/uploads/presign", &request).await?;

        tracing::debug!(file_name, bytes = data.len(), "uploading to presigned url");
        self.api.put_bytes(&target.upload_url, content_type, data).await?;
        Ok(target.file_url)
    }
}
