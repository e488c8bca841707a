//! Replace coordination.
//!
//! The new object must be durable before the old one is touched. If the
//! upload fails the old object stays untouched; if only the delete fails
//! the caller still gets a successful result and the orphan is logged.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::gateway::ObjectGateway;
use crate::store::delete_remote_object;
use crate::types::{MediaFile, UploadResult};
use crate::upload::{build_descriptor, run_upload};

pub(crate) async fn replace_object(
    gateway: &dyn ObjectGateway,
    file: &MediaFile,
    directory: &str,
    old_path: Option<&str>,
    owner_id: Option<&str>,
    cancel: &CancellationToken,
) -> Result<UploadResult, StoreError> {
    let descriptor = build_descriptor(file, directory, owner_id).await?;
    let result = run_upload(gateway, &descriptor, cancel).await?;

    if let Some(old) = old_path
        && !old.is_empty()
    {
        cleanup_old_object(gateway, old).await;
    }

    Ok(result)
}

/// Best-effort removal of the object a replace superseded. `stored` may be
/// a bare path or a full public URL.
async fn cleanup_old_object(gateway: &dyn ObjectGateway, stored: &str) {
    let path = bare_object_path(stored);
    match delete_remote_object(gateway, path).await {
        Ok(true) => info!(path = %path, "replaced object deleted"),
        Ok(false) => warn!(path = %path, "replaced object was already gone"),
        Err(err) => warn!(path = %path, error = %err, "failed to delete replaced object"),
    }
}

/// Reduces a stored reference to the bare object path. Download URLs have
/// the shape `{base}/file/{bucket}/{path}`; anything that is not a URL is
/// returned unchanged.
pub(crate) fn bare_object_path(stored: &str) -> &str {
    if !stored.starts_with("http://") && !stored.starts_with("https://") {
        return stored;
    }
    let Some(idx) = stored.find("/file/") else {
        return stored;
    };
    let after = &stored[idx + "/file/".len()..];
    match after.find('/') {
        Some(slash) => &after[slash + 1..],
        None => stored,
    }
}
