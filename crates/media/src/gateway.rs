//! Gateway between the engine and the object store.
//!
//! Transfer flows never talk to the REST client directly; they go through
//! [`ObjectGateway`] so tests can substitute a scripted in-memory store.
//! Methods take owned arguments and return boxed futures to keep the trait
//! object-safe.

use std::future::Future;
use std::pin::Pin;

use skystow_remote::{RemoteClient, RemoteError, RemoteObject, UploadTarget};

/// Future type returned by every [`ObjectGateway`] method.
pub type GatewayFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, RemoteError>> + Send + 'a>>;

pub trait ObjectGateway: Send + Sync {
    /// Requests a one-time upload endpoint for the bucket.
    fn fetch_upload_target(&self) -> GatewayFuture<'_, UploadTarget>;

    /// Uploads a whole object to a one-time target.
    fn put_object(
        &self,
        target: UploadTarget,
        remote_path: String,
        sha1: String,
        data: Vec<u8>,
    ) -> GatewayFuture<'_, ()>;

    /// Opens a multi-part session and returns its id.
    fn start_large_object(
        &self,
        remote_path: String,
        content_type: String,
    ) -> GatewayFuture<'_, String>;

    /// Requests a one-time endpoint for the next part of a session.
    fn fetch_part_target(&self, session_id: String) -> GatewayFuture<'_, UploadTarget>;

    /// Uploads one part to a part endpoint.
    fn put_part(
        &self,
        target: UploadTarget,
        part_number: u32,
        sha1: String,
        data: Vec<u8>,
    ) -> GatewayFuture<'_, ()>;

    /// Seals a session from the ordered part digests.
    fn finish_large_object(
        &self,
        session_id: String,
        part_sha1s: Vec<String>,
    ) -> GatewayFuture<'_, ()>;

    /// Abandons a session whose parts will never be completed.
    fn cancel_large_object(&self, session_id: String) -> GatewayFuture<'_, ()>;

    /// Lists one page of objects under `prefix`.
    fn list_objects(
        &self,
        prefix: String,
        max_count: u32,
    ) -> GatewayFuture<'_, Vec<RemoteObject>>;

    /// Deletes one stored object version.
    fn delete_object(&self, file_id: String, file_name: String) -> GatewayFuture<'_, ()>;

    /// Public download URL for a stored path.
    fn download_url(&self, remote_path: String) -> GatewayFuture<'_, String>;
}

impl ObjectGateway for RemoteClient {
    fn fetch_upload_target(&self) -> GatewayFuture<'_, UploadTarget> {
        Box::pin(self.get_upload_url())
    }

    fn put_object(
        &self,
        target: UploadTarget,
        remote_path: String,
        sha1: String,
        data: Vec<u8>,
    ) -> GatewayFuture<'_, ()> {
        Box::pin(async move { self.upload_object(&target, &remote_path, &sha1, data).await })
    }

    fn start_large_object(
        &self,
        remote_path: String,
        content_type: String,
    ) -> GatewayFuture<'_, String> {
        Box::pin(async move { self.start_large_file(&remote_path, &content_type).await })
    }

    fn fetch_part_target(&self, session_id: String) -> GatewayFuture<'_, UploadTarget> {
        Box::pin(async move { self.get_upload_part_url(&session_id).await })
    }

    fn put_part(
        &self,
        target: UploadTarget,
        part_number: u32,
        sha1: String,
        data: Vec<u8>,
    ) -> GatewayFuture<'_, ()> {
        Box::pin(async move { self.upload_part(&target, part_number, &sha1, data).await })
    }

    fn finish_large_object(
        &self,
        session_id: String,
        part_sha1s: Vec<String>,
    ) -> GatewayFuture<'_, ()> {
        Box::pin(async move { self.finish_large_file(&session_id, part_sha1s).await })
    }

    fn cancel_large_object(&self, session_id: String) -> GatewayFuture<'_, ()> {
        Box::pin(async move { self.cancel_large_file(&session_id).await })
    }

    fn list_objects(
        &self,
        prefix: String,
        max_count: u32,
    ) -> GatewayFuture<'_, Vec<RemoteObject>> {
        Box::pin(async move { self.list_file_names(&prefix, max_count).await })
    }

    fn delete_object(&self, file_id: String, file_name: String) -> GatewayFuture<'_, ()> {
        Box::pin(async move { self.delete_file_version(&file_id, &file_name).await })
    }

    fn download_url(&self, remote_path: String) -> GatewayFuture<'_, String> {
        Box::pin(async move { self.public_url(&remote_path).await })
    }
}
