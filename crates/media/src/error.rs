//! Engine error types.

use skystow_remote::RemoteError;
use skystow_transfer::TransferError;

/// Errors surfaced to callers of the media store.
///
/// `Validation` is always raised before any network call. `Upload` is the
/// single terminal error for a failed transfer and carries the last remote
/// response in its message. `Auth` stays distinct because a rejected account
/// key must never be retried.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("authorization failed: {0}")]
    Auth(#[source] RemoteError),

    #[error("upload failed: {message}")]
    Upload {
        message: String,
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },

    #[error("remote call failed: {0}")]
    Remote(#[source] RemoteError),

    #[error("operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),
}

impl StoreError {
    pub(crate) fn upload(message: impl Into<String>) -> Self {
        StoreError::Upload {
            message: message.into(),
            cause: None,
        }
    }

    /// Wraps a failed remote call made from an upload flow. Auth failures
    /// keep their own variant so callers can tell a bad account key from a
    /// flaky transfer.
    pub(crate) fn upload_step(step: &str, err: RemoteError) -> Self {
        match err {
            RemoteError::Auth { .. } => StoreError::Auth(err),
            other => {
                let message = format!("{step}: {other}");
                StoreError::Upload {
                    message,
                    cause: Some(Box::new(other)),
                }
            }
        }
    }
}

impl From<RemoteError> for StoreError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Auth { .. } => StoreError::Auth(err),
            other => StoreError::Remote(other),
        }
    }
}
