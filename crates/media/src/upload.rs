//! Upload validation, destination naming, and transfer routing.

use std::path::Path;

use rand::Rng;
use skystow_transfer::{PART_SIZE, validate_remote_path};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::chunked::upload_chunked;
use crate::error::StoreError;
use crate::gateway::ObjectGateway;
use crate::simple::upload_simple;
use crate::types::{MediaFile, UploadDescriptor, UploadResult};

/// Hard cap on any single object.
pub const MAX_OBJECT_BYTES: u64 = 500 * 1024 * 1024;

/// Objects at or below this size go through the single-shot path; anything
/// larger is split into parts.
pub const SIMPLE_LIMIT_BYTES: u64 = 100 * 1024 * 1024;

/// Content types the engine accepts. Everything else is rejected before any
/// network traffic.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/heic",
    "video/mp4",
    "video/quicktime",
    "video/webm",
    "audio/mpeg",
    "audio/wav",
    "audio/ogg",
    "audio/mp4",
    "application/pdf",
    "text/plain",
    "text/csv",
    "text/markdown",
    "application/zip",
    "application/gzip",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransferKind {
    Simple,
    Chunked,
}

pub(crate) fn transfer_kind_for(size_bytes: u64) -> TransferKind {
    if size_bytes <= SIMPLE_LIMIT_BYTES {
        TransferKind::Simple
    } else {
        TransferKind::Chunked
    }
}

/// Validates the source file and fixes every input of this upload into an
/// immutable descriptor. All rejections happen here, before any request.
pub(crate) async fn build_descriptor(
    file: &MediaFile,
    directory: &str,
    owner_id: Option<&str>,
) -> Result<UploadDescriptor, StoreError> {
    if file.original_name.trim().is_empty() {
        return Err(StoreError::Validation("missing original filename".into()));
    }
    if !ALLOWED_CONTENT_TYPES.contains(&file.content_type.as_str()) {
        return Err(StoreError::Validation(format!(
            "content type not allowed: {}",
            file.content_type
        )));
    }

    let metadata = tokio::fs::metadata(&file.path).await.map_err(|err| {
        StoreError::Validation(format!("unreadable source {}: {err}", file.path.display()))
    })?;
    if !metadata.is_file() {
        return Err(StoreError::Validation(format!(
            "not a regular file: {}",
            file.path.display()
        )));
    }
    let size_bytes = metadata.len();
    if size_bytes == 0 {
        return Err(StoreError::Validation("empty file".into()));
    }
    if size_bytes > MAX_OBJECT_BYTES {
        return Err(StoreError::Validation(format!(
            "file is {size_bytes} bytes, above the {MAX_OBJECT_BYTES}-byte limit"
        )));
    }

    let filename = generate_object_name(&file.original_name);
    let remote_path = match owner_id {
        Some(owner) if !owner.is_empty() => format!("{directory}/{owner}/{filename}"),
        _ => format!("{directory}/{filename}"),
    };
    validate_remote_path(&remote_path)
        .map_err(|err| StoreError::Validation(err.to_string()))?;

    Ok(UploadDescriptor {
        source: file.path.clone(),
        remote_path,
        size_bytes,
        content_type: file.content_type.clone(),
        original_name: file.original_name.clone(),
    })
}

/// Collision-resistant stored name: millisecond timestamp plus a random
/// suffix, keeping only the original extension.
pub(crate) fn generate_object_name(original_name: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let mut suffix = [0u8; 4];
    rand::thread_rng().fill(&mut suffix);
    match extension_of(original_name) {
        Some(ext) => format!("{timestamp}_{}.{ext}", hex::encode(suffix)),
        None => format!("{timestamp}_{}", hex::encode(suffix)),
    }
}

fn extension_of(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Runs a validated upload over the path its size selects and shapes the
/// caller-facing result.
pub(crate) async fn run_upload(
    gateway: &dyn ObjectGateway,
    descriptor: &UploadDescriptor,
    cancel: &CancellationToken,
) -> Result<UploadResult, StoreError> {
    match transfer_kind_for(descriptor.size_bytes) {
        TransferKind::Simple => upload_simple(gateway, descriptor, cancel).await?,
        TransferKind::Chunked => upload_chunked(gateway, descriptor, PART_SIZE, cancel).await?,
    }

    let remote_url = gateway.download_url(descriptor.remote_path.clone()).await?;

    info!(
        path = %descriptor.remote_path,
        size = descriptor.size_bytes,
        "upload complete"
    );

    Ok(UploadResult {
        success: true,
        remote_url,
        remote_path: descriptor.remote_path.clone(),
        size_bytes: descriptor.size_bytes,
        content_type: descriptor.content_type.clone(),
        original_name: descriptor.original_name.clone(),
    })
}
