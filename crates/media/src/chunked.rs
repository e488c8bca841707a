//! Multi-part transfer session.
//!
//! start -> put parts -> finish, strictly in part order. A failed part is
//! not retried: the open session is abandoned best-effort and the part's
//! error surfaces unchanged.

use skystow_transfer::ChunkReader;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::gateway::ObjectGateway;
use crate::types::UploadDescriptor;

/// Bookkeeping for one uploaded part.
#[derive(Debug, Clone)]
struct PartRecord {
    number: u32,
    sha1: String,
}

pub(crate) async fn upload_chunked(
    gateway: &dyn ObjectGateway,
    descriptor: &UploadDescriptor,
    part_size: usize,
    cancel: &CancellationToken,
) -> Result<(), StoreError> {
    let session_id = gateway
        .start_large_object(descriptor.remote_path.clone(), descriptor.content_type.clone())
        .await
        .map_err(|err| StoreError::upload_step("start_large_file", err))?;

    debug!(
        path = %descriptor.remote_path,
        session = %session_id,
        size = descriptor.size_bytes,
        "multi-part session started"
    );

    let result = run_session(gateway, descriptor, &session_id, part_size, cancel).await;
    if result.is_err() {
        abandon_session(gateway, &session_id).await;
    }
    result
}

async fn run_session(
    gateway: &dyn ObjectGateway,
    descriptor: &UploadDescriptor,
    session_id: &str,
    part_size: usize,
    cancel: &CancellationToken,
) -> Result<(), StoreError> {
    let source = descriptor.source.clone();
    let mut reader = tokio::task::spawn_blocking(move || ChunkReader::open(&source, part_size))
        .await
        .map_err(join_error)??;

    let mut parts: Vec<PartRecord> = Vec::with_capacity(reader.part_count() as usize);

    loop {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        // The reader moves into the blocking pool for the disk read and
        // comes back with the part, keeping the async runtime unblocked.
        let (returned, next) = tokio::task::spawn_blocking(move || {
            let next = reader.next_part();
            (reader, next)
        })
        .await
        .map_err(join_error)?;
        reader = returned;

        let Some(part) = next? else {
            break;
        };

        let target = gateway
            .fetch_part_target(session_id.to_string())
            .await
            .map_err(|err| StoreError::upload_step("get_upload_part_url", err))?;

        debug!(part = part.number, bytes = part.data.len(), "uploading part");

        gateway
            .put_part(target, part.number, part.sha1.clone(), part.data)
            .await
            .map_err(|err| {
                StoreError::upload_step(&format!("upload_part {}", part.number), err)
            })?;

        parts.push(PartRecord {
            number: part.number,
            sha1: part.sha1,
        });
    }

    // Parts are read and sent sequentially, so this is already in part
    // order; the sort keeps the finish call correct should dispatch ever
    // change.
    parts.sort_by_key(|part| part.number);
    let digests = parts.into_iter().map(|part| part.sha1).collect();

    gateway
        .finish_large_object(session_id.to_string(), digests)
        .await
        .map_err(|err| StoreError::upload_step("finish_large_file", err))?;

    debug!(path = %descriptor.remote_path, "multi-part session finished");
    Ok(())
}

/// Tells the store to drop a session that will never finish. The original
/// failure is what callers see; a failed cancel is only logged.
async fn abandon_session(gateway: &dyn ObjectGateway, session_id: &str) {
    if let Err(err) = gateway.cancel_large_object(session_id.to_string()).await {
        warn!(session = %session_id, error = %err, "failed to cancel abandoned session");
    } else {
        debug!(session = %session_id, "abandoned session cancelled");
    }
}

fn join_error(err: tokio::task::JoinError) -> StoreError {
    StoreError::upload(format!("blocking read task failed: {err}"))
}
