//! REST client for the remote object store.
//!
//! Covers account authorization with a cached short-lived credential set,
//! single-shot and multi-part upload calls, listing, and deletion. The wire
//! protocol is fixed; this crate does not abstract over other stores.

mod auth;
mod client;
mod config;
mod types;

pub use auth::{CREDENTIAL_TTL, CredentialCache, Credentials};
pub use client::RemoteClient;
pub use config::AccountConfig;
pub use types::{
    AuthorizeResponse, ListFileNamesResponse, RemoteObject, StartLargeFileResponse, UploadTarget,
};

/// Errors produced by the remote client.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("authorization rejected (status {status}): {body}")]
    Auth { status: u16, body: String },

    #[error("{endpoint} failed (status {status}): {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{endpoint} returned an unparseable response: {source}")]
    InvalidResponse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}
