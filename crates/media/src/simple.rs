//! Single-shot transfer with bounded retry.

use std::time::Duration;

use skystow_remote::RemoteError;
use skystow_transfer::sha1_hex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::gateway::ObjectGateway;
use crate::types::UploadDescriptor;

/// Attempts per object, the first one included.
pub(crate) const MAX_ATTEMPTS: u32 = 3;

/// Pause after failed attempt `attempt`: 2s after the first, 4s after the
/// second.
pub(crate) fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(u64::from(attempt) * 2)
}

/// Uploads the whole object in one request, retrying transient failures.
///
/// The source is read once and every attempt re-sends the same buffer, so
/// the digest never goes stale. Each attempt gets a fresh one-time target.
/// Auth failures abort immediately; retrying a rejected account key cannot
/// succeed.
pub(crate) async fn upload_simple(
    gateway: &dyn ObjectGateway,
    descriptor: &UploadDescriptor,
    cancel: &CancellationToken,
) -> Result<(), StoreError> {
    let data = tokio::fs::read(&descriptor.source).await?;
    let sha1 = sha1_hex(&data);

    let mut last_error: Option<RemoteError> = None;
    for attempt in 1..=MAX_ATTEMPTS {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        match try_put(gateway, descriptor, &sha1, data.clone()).await {
            Ok(()) => {
                debug!(path = %descriptor.remote_path, attempt, "object stored");
                return Ok(());
            }
            Err(err @ RemoteError::Auth { .. }) => return Err(StoreError::Auth(err)),
            Err(err) => {
                warn!(
                    path = %descriptor.remote_path,
                    attempt,
                    error = %err,
                    "upload attempt failed"
                );
                last_error = Some(err);
                if attempt < MAX_ATTEMPTS {
                    tokio::time::sleep(backoff_delay(attempt)).await;
                }
            }
        }
    }

    Err(match last_error {
        Some(cause) => {
            let message = format!("upload failed after {MAX_ATTEMPTS} attempts: {cause}");
            StoreError::Upload {
                message,
                cause: Some(Box::new(cause)),
            }
        }
        None => StoreError::upload(format!("upload failed after {MAX_ATTEMPTS} attempts")),
    })
}

async fn try_put(
    gateway: &dyn ObjectGateway,
    descriptor: &UploadDescriptor,
    sha1: &str,
    data: Vec<u8>,
) -> Result<(), RemoteError> {
    let target = gateway.fetch_upload_target().await?;
    gateway
        .put_object(target, descriptor.remote_path.clone(), sha1.to_string(), data)
        .await
}
