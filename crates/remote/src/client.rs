use std::sync::Arc;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::de::DeserializeOwned;

use crate::RemoteError;
use crate::auth::{CredentialCache, Credentials};
use crate::config::AccountConfig;
use crate::types::{
    AuthorizeResponse, CancelLargeFileRequest, DeleteFileVersionRequest, FinishLargeFileRequest,
    GetUploadPartUrlRequest, GetUploadUrlRequest, ListFileNamesRequest, ListFileNamesResponse,
    RemoteObject, StartLargeFileRequest, StartLargeFileResponse, UploadTarget,
};

/// Timeout for metadata/control calls (authorize, session control, listing).
const CONTROL_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for a whole single-shot object upload.
const OBJECT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(900);
/// Timeout for one part upload.
const PART_UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Characters percent-encoded in the `X-File-Name` header: everything except
/// unreserved URL characters and the path separator.
const FILE_NAME_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'.')
    .remove(b'_')
    .remove(b'-')
    .remove(b'~');

/// Client for the object store's REST API.
///
/// Holds one HTTP client and the account credential cache; cheap to share
/// behind an `Arc`. All calls authenticate with the cached account token
/// except the upload PUTs, which use the one-time target token instead.
pub struct RemoteClient {
    http: reqwest::Client,
    config: AccountConfig,
    auth: CredentialCache,
}

impl RemoteClient {
    pub fn new(config: AccountConfig) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            config,
            auth: CredentialCache::new(),
        })
    }

    /// Current credentials, refreshed through `authorize_account` on expiry.
    pub async fn credentials(&self) -> Result<Arc<Credentials>, RemoteError> {
        self.auth
            .get_or_refresh(|| authorize_account(&self.http, &self.config))
            .await
    }

    /// Requests a one-time upload endpoint for the configured bucket.
    pub async fn get_upload_url(&self) -> Result<UploadTarget, RemoteError> {
        let creds = self.credentials().await?;
        let body = GetUploadUrlRequest {
            bucket_id: self.config.bucket_id.clone(),
        };
        self.post_json(&creds, "get_upload_url", &body).await
    }

    /// Uploads a whole object to a one-time upload target.
    pub async fn upload_object(
        &self,
        target: &UploadTarget,
        remote_path: &str,
        sha1: &str,
        data: Vec<u8>,
    ) -> Result<(), RemoteError> {
        let response = self
            .http
            .put(&target.upload_url)
            .header("Authorization", &target.upload_auth_token)
            .header("X-File-Name", encode_file_name(remote_path))
            .header("Content-Type", "application/octet-stream")
            .header("X-Content-Sha1", sha1)
            .timeout(OBJECT_UPLOAD_TIMEOUT)
            .body(data)
            .send()
            .await?;
        expect_success("upload_object", response).await
    }

    /// Opens a multi-part session; returns the session's file id.
    pub async fn start_large_file(
        &self,
        remote_path: &str,
        content_type: &str,
    ) -> Result<String, RemoteError> {
        let creds = self.credentials().await?;
        let body = StartLargeFileRequest {
            bucket_id: self.config.bucket_id.clone(),
            file_name: remote_path.to_string(),
            content_type: content_type.to_string(),
        };
        let parsed: StartLargeFileResponse =
            self.post_json(&creds, "start_large_file", &body).await?;
        Ok(parsed.file_id)
    }

    /// Requests a one-time upload endpoint for one part of an open session.
    ///
    /// The store may rotate part endpoints, so this is called once per part.
    pub async fn get_upload_part_url(&self, file_id: &str) -> Result<UploadTarget, RemoteError> {
        let creds = self.credentials().await?;
        let body = GetUploadPartUrlRequest {
            file_id: file_id.to_string(),
        };
        self.post_json(&creds, "get_upload_part_url", &body).await
    }

    /// Uploads one part to a one-time part target.
    pub async fn upload_part(
        &self,
        target: &UploadTarget,
        part_number: u32,
        sha1: &str,
        data: Vec<u8>,
    ) -> Result<(), RemoteError> {
        let response = self
            .http
            .put(&target.upload_url)
            .header("Authorization", &target.upload_auth_token)
            .header("X-Part-Number", part_number.to_string())
            .header("Content-Length", data.len().to_string())
            .header("X-Content-Sha1", sha1)
            .timeout(PART_UPLOAD_TIMEOUT)
            .body(data)
            .send()
            .await?;
        expect_success("upload_part", response).await
    }

    /// Closes a multi-part session with the ordered part digests.
    pub async fn finish_large_file(
        &self,
        file_id: &str,
        part_sha1_array: Vec<String>,
    ) -> Result<(), RemoteError> {
        let creds = self.credentials().await?;
        let body = FinishLargeFileRequest {
            file_id: file_id.to_string(),
            part_sha1_array,
        };
        let _: serde_json::Value = self.post_json(&creds, "finish_large_file", &body).await?;
        Ok(())
    }

    /// Abandons a half-created multi-part session.
    pub async fn cancel_large_file(&self, file_id: &str) -> Result<(), RemoteError> {
        let creds = self.credentials().await?;
        let body = CancelLargeFileRequest {
            file_id: file_id.to_string(),
        };
        let _: serde_json::Value = self.post_json(&creds, "cancel_large_file", &body).await?;
        Ok(())
    }

    /// Lists object names under `prefix`, bounded to one page of
    /// `max_file_count` entries.
    pub async fn list_file_names(
        &self,
        prefix: &str,
        max_file_count: u32,
    ) -> Result<Vec<RemoteObject>, RemoteError> {
        let creds = self.credentials().await?;
        let body = ListFileNamesRequest {
            bucket_id: self.config.bucket_id.clone(),
            prefix: prefix.to_string(),
            max_file_count,
        };
        let parsed: ListFileNamesResponse =
            self.post_json(&creds, "list_file_names", &body).await?;
        Ok(parsed.files)
    }

    /// Deletes one stored version of an object.
    pub async fn delete_file_version(
        &self,
        file_id: &str,
        file_name: &str,
    ) -> Result<(), RemoteError> {
        let creds = self.credentials().await?;
        let body = DeleteFileVersionRequest {
            file_id: file_id.to_string(),
            file_name: file_name.to_string(),
        };
        let _: serde_json::Value = self.post_json(&creds, "delete_file_version", &body).await?;
        Ok(())
    }

    /// Public download URL for a stored object.
    pub async fn public_url(&self, remote_path: &str) -> Result<String, RemoteError> {
        let creds = self.credentials().await?;
        Ok(public_url_for(
            &creds.download_base,
            &self.config.bucket_name,
            remote_path,
        ))
    }

    async fn post_json<B, T>(
        &self,
        creds: &Credentials,
        op: &str,
        body: &B,
    ) -> Result<T, RemoteError>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(api_url(&creds.api_base, op))
            .header("Authorization", &creds.token)
            .timeout(CONTROL_TIMEOUT)
            .json(body)
            .send()
            .await?;
        decode_json(op, response).await
    }
}

async fn authorize_account(
    http: &reqwest::Client,
    config: &AccountConfig,
) -> Result<Credentials, RemoteError> {
    let basic = BASE64.encode(format!("{}:{}", config.key_id, config.secret));
    let response = http
        .get(api_url(&config.api_base, "authorize_account"))
        .header("Authorization", format!("Basic {basic}"))
        .timeout(CONTROL_TIMEOUT)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(RemoteError::Auth {
            status: status.as_u16(),
            body,
        });
    }

    let parsed: AuthorizeResponse =
        serde_json::from_str(&body).map_err(|source| RemoteError::InvalidResponse {
            endpoint: "authorize_account".into(),
            source,
        })?;
    Ok(Credentials {
        token: parsed.token,
        api_base: parsed.api_url,
        download_base: parsed.download_url,
    })
}

async fn decode_json<T: DeserializeOwned>(
    op: &str,
    response: reqwest::Response,
) -> Result<T, RemoteError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(RemoteError::Api {
            endpoint: op.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|source| RemoteError::InvalidResponse {
        endpoint: op.to_string(),
        source,
    })
}

async fn expect_success(op: &str, response: reqwest::Response) -> Result<(), RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await?;
    Err(RemoteError::Api {
        endpoint: op.to_string(),
        status: status.as_u16(),
        body,
    })
}

fn api_url(base: &str, op: &str) -> String {
    format!("{}/v2/{}", base.trim_end_matches('/'), op)
}

fn encode_file_name(name: &str) -> String {
    utf8_percent_encode(name, FILE_NAME_ENCODE).to_string()
}

fn public_url_for(download_base: &str, bucket_name: &str, remote_path: &str) -> String {
    format!(
        "{}/file/{}/{}",
        download_base.trim_end_matches('/'),
        bucket_name,
        remote_path
    )
}
