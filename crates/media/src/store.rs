//! Caller-facing media store.

use std::sync::Arc;

use skystow_remote::{AccountConfig, RemoteClient};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::catalog;
use crate::error::StoreError;
use crate::gateway::ObjectGateway;
use crate::replace::replace_object;
use crate::types::{CatalogEntry, MediaCategory, MediaFile, UploadResult};
use crate::upload::{build_descriptor, run_upload};

/// Facade over one remote bucket. Cheap to clone via the shared gateway;
/// credentials are cached inside the client, so embedding code should keep
/// one store per bucket.
pub struct MediaStore {
    gateway: Arc<dyn ObjectGateway>,
}

impl MediaStore {
    /// Builds a store backed by the REST client.
    pub fn new(config: AccountConfig) -> Result<Self, StoreError> {
        let client = RemoteClient::new(config)?;
        Ok(Self {
            gateway: Arc::new(client),
        })
    }

    /// Builds a store over any gateway implementation.
    pub fn with_gateway(gateway: Arc<dyn ObjectGateway>) -> Self {
        Self { gateway }
    }

    /// Validates and uploads `file` under `directory`, scoped to `owner_id`
    /// when given. Returns the stored path and public URL.
    pub async fn upload(
        &self,
        file: &MediaFile,
        directory: &str,
        owner_id: Option<&str>,
    ) -> Result<UploadResult, StoreError> {
        self.upload_with_cancel(file, directory, owner_id, &CancellationToken::new())
            .await
    }

    /// [`upload`](Self::upload) with a caller-held cancellation token.
    /// Cancellation is observed between requests, never mid-request.
    pub async fn upload_with_cancel(
        &self,
        file: &MediaFile,
        directory: &str,
        owner_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<UploadResult, StoreError> {
        let descriptor = build_descriptor(file, directory, owner_id).await?;
        run_upload(self.gateway.as_ref(), &descriptor, cancel).await
    }

    /// Uploads `file` and then removes the object previously stored at
    /// `old_path`. The old object is only touched after the new upload
    /// succeeded; a failed delete is logged, not returned.
    pub async fn replace(
        &self,
        file: &MediaFile,
        directory: &str,
        old_path: Option<&str>,
        owner_id: Option<&str>,
    ) -> Result<UploadResult, StoreError> {
        self.replace_with_cancel(file, directory, old_path, owner_id, &CancellationToken::new())
            .await
    }

    /// [`replace`](Self::replace) with a caller-held cancellation token.
    pub async fn replace_with_cancel(
        &self,
        file: &MediaFile,
        directory: &str,
        old_path: Option<&str>,
        owner_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<UploadResult, StoreError> {
        replace_object(self.gateway.as_ref(), file, directory, old_path, owner_id, cancel).await
    }

    /// Deletes the object stored at `path`. `Ok(false)` when no such
    /// object exists.
    pub async fn delete(&self, path: &str) -> Result<bool, StoreError> {
        delete_remote_object(self.gateway.as_ref(), path).await
    }

    /// Public download URL for a stored path.
    pub async fn public_url(&self, path: &str) -> Result<String, StoreError> {
        Ok(self.gateway.download_url(path.to_string()).await?)
    }

    /// Lists `owner_id`'s media, newest first, optionally narrowed to one
    /// category.
    pub async fn list_user_media(
        &self,
        owner_id: &str,
        category: Option<MediaCategory>,
        max_files: u32,
    ) -> Result<Vec<CatalogEntry>, StoreError> {
        catalog::list_user_media(self.gateway.as_ref(), owner_id, category, max_files).await
    }
}

/// Resolves `path` to its stored version and deletes it. The listing is
/// prefix-based, so the name must match exactly before anything is removed.
pub(crate) async fn delete_remote_object(
    gateway: &dyn ObjectGateway,
    path: &str,
) -> Result<bool, StoreError> {
    let matches = gateway.list_objects(path.to_string(), 1).await?;
    let Some(object) = matches.into_iter().find(|o| o.file_name == path) else {
        return Ok(false);
    };

    gateway
        .delete_object(object.file_id.clone(), object.file_name)
        .await?;
    info!(path = %path, id = %object.file_id, "object deleted");
    Ok(true)
}
