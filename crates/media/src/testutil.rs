//! Test support: a scripted in-memory gateway.
//!
//! Every call is recorded. Responses come from per-method queues, consumed
//! front to back; an empty queue means success with a canned value, so
//! tests only script the interesting parts.

use std::sync::Mutex;

use skystow_remote::{RemoteError, RemoteObject, UploadTarget};

use crate::gateway::{GatewayFuture, ObjectGateway};

/// One recorded gateway call. Bulky payloads are reduced to their sizes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GatewayCall {
    FetchUploadTarget,
    PutObject {
        remote_path: String,
        sha1: String,
        size: usize,
    },
    StartLargeObject {
        remote_path: String,
        content_type: String,
    },
    FetchPartTarget {
        session_id: String,
    },
    PutPart {
        part_number: u32,
        sha1: String,
        size: usize,
    },
    FinishLargeObject {
        session_id: String,
        part_sha1s: Vec<String>,
    },
    CancelLargeObject {
        session_id: String,
    },
    ListObjects {
        prefix: String,
        max_count: u32,
    },
    DeleteObject {
        file_id: String,
        file_name: String,
    },
    DownloadUrl {
        remote_path: String,
    },
}

#[derive(Default)]
pub(crate) struct MockGateway {
    calls: Mutex<Vec<GatewayCall>>,
    fetch_target_queue: Mutex<Vec<Result<UploadTarget, RemoteError>>>,
    put_object_queue: Mutex<Vec<Result<(), RemoteError>>>,
    start_queue: Mutex<Vec<Result<String, RemoteError>>>,
    part_target_queue: Mutex<Vec<Result<UploadTarget, RemoteError>>>,
    put_part_queue: Mutex<Vec<Result<(), RemoteError>>>,
    finish_queue: Mutex<Vec<Result<(), RemoteError>>>,
    cancel_queue: Mutex<Vec<Result<(), RemoteError>>>,
    list_queue: Mutex<Vec<Result<Vec<RemoteObject>, RemoteError>>>,
    delete_queue: Mutex<Vec<Result<(), RemoteError>>>,
}

impl MockGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn recorded(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count_fetch_targets(&self) -> usize {
        self.count(|call| matches!(call, GatewayCall::FetchUploadTarget))
    }

    pub(crate) fn count_put_objects(&self) -> usize {
        self.count(|call| matches!(call, GatewayCall::PutObject { .. }))
    }

    fn count(&self, pred: impl Fn(&GatewayCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub(crate) fn script_fetch_target(&self, result: Result<UploadTarget, RemoteError>) {
        self.fetch_target_queue.lock().unwrap().push(result);
    }

    pub(crate) fn script_put_object(&self, result: Result<(), RemoteError>) {
        self.put_object_queue.lock().unwrap().push(result);
    }

    pub(crate) fn script_start(&self, result: Result<String, RemoteError>) {
        self.start_queue.lock().unwrap().push(result);
    }

    pub(crate) fn script_put_part(&self, result: Result<(), RemoteError>) {
        self.put_part_queue.lock().unwrap().push(result);
    }

    pub(crate) fn script_finish(&self, result: Result<(), RemoteError>) {
        self.finish_queue.lock().unwrap().push(result);
    }

    pub(crate) fn script_cancel(&self, result: Result<(), RemoteError>) {
        self.cancel_queue.lock().unwrap().push(result);
    }

    pub(crate) fn script_list(&self, result: Result<Vec<RemoteObject>, RemoteError>) {
        self.list_queue.lock().unwrap().push(result);
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

fn pop_or<T>(
    queue: &Mutex<Vec<Result<T, RemoteError>>>,
    fallback: impl FnOnce() -> T,
) -> Result<T, RemoteError> {
    let mut queue = queue.lock().unwrap();
    if queue.is_empty() {
        Ok(fallback())
    } else {
        queue.remove(0)
    }
}

fn canned_target() -> UploadTarget {
    UploadTarget {
        upload_url: "https://pod.test/upload".into(),
        upload_auth_token: "upload-token".into(),
    }
}

impl ObjectGateway for MockGateway {
    fn fetch_upload_target(&self) -> GatewayFuture<'_, UploadTarget> {
        self.record(GatewayCall::FetchUploadTarget);
        let result = pop_or(&self.fetch_target_queue, canned_target);
        Box::pin(async move { result })
    }

    fn put_object(
        &self,
        _target: UploadTarget,
        remote_path: String,
        sha1: String,
        data: Vec<u8>,
    ) -> GatewayFuture<'_, ()> {
        self.record(GatewayCall::PutObject {
            remote_path,
            sha1,
            size: data.len(),
        });
        let result = pop_or(&self.put_object_queue, || ());
        Box::pin(async move { result })
    }

    fn start_large_object(
        &self,
        remote_path: String,
        content_type: String,
    ) -> GatewayFuture<'_, String> {
        self.record(GatewayCall::StartLargeObject {
            remote_path,
            content_type,
        });
        let result = pop_or(&self.start_queue, || "session-1".to_string());
        Box::pin(async move { result })
    }

    fn fetch_part_target(&self, session_id: String) -> GatewayFuture<'_, UploadTarget> {
        self.record(GatewayCall::FetchPartTarget { session_id });
        let result = pop_or(&self.part_target_queue, canned_target);
        Box::pin(async move { result })
    }

    fn put_part(
        &self,
        _target: UploadTarget,
        part_number: u32,
        sha1: String,
        data: Vec<u8>,
    ) -> GatewayFuture<'_, ()> {
        self.record(GatewayCall::PutPart {
            part_number,
            sha1,
            size: data.len(),
        });
        let result = pop_or(&self.put_part_queue, || ());
        Box::pin(async move { result })
    }

    fn finish_large_object(
        &self,
        session_id: String,
        part_sha1s: Vec<String>,
    ) -> GatewayFuture<'_, ()> {
        self.record(GatewayCall::FinishLargeObject {
            session_id,
            part_sha1s,
        });
        let result = pop_or(&self.finish_queue, || ());
        Box::pin(async move { result })
    }

    fn cancel_large_object(&self, session_id: String) -> GatewayFuture<'_, ()> {
        self.record(GatewayCall::CancelLargeObject { session_id });
        let result = pop_or(&self.cancel_queue, || ());
        Box::pin(async move { result })
    }

    fn list_objects(
        &self,
        prefix: String,
        max_count: u32,
    ) -> GatewayFuture<'_, Vec<RemoteObject>> {
        self.record(GatewayCall::ListObjects { prefix, max_count });
        let result = pop_or(&self.list_queue, Vec::new);
        Box::pin(async move { result })
    }

    fn delete_object(&self, file_id: String, file_name: String) -> GatewayFuture<'_, ()> {
        self.record(GatewayCall::DeleteObject { file_id, file_name });
        let result = pop_or(&self.delete_queue, || ());
        Box::pin(async move { result })
    }

    fn download_url(&self, remote_path: String) -> GatewayFuture<'_, String> {
        let url = format!("https://dl.test/file/media-test/{remote_path}");
        self.record(GatewayCall::DownloadUrl { remote_path });
        Box::pin(async move { Ok(url) })
    }
}

/// A transient server-side failure.
pub(crate) fn service_unavailable() -> RemoteError {
    RemoteError::Api {
        endpoint: "test".into(),
        status: 503,
        body: "service busy".into(),
    }
}

/// A rejected account key.
pub(crate) fn auth_rejected() -> RemoteError {
    RemoteError::Auth {
        status: 401,
        body: "invalid account key".into(),
    }
}

pub(crate) fn stored_object(
    id: &str,
    name: &str,
    content_type: &str,
    size: u64,
    uploaded_at: i64,
) -> RemoteObject {
    RemoteObject {
        file_id: id.into(),
        file_name: name.into(),
        content_type: content_type.into(),
        content_length: size,
        upload_timestamp: uploaded_at,
    }
}
