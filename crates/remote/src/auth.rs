use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::RemoteError;

/// How long an authorization token stays usable before a fresh
/// `authorize_account` call is required.
pub const CREDENTIAL_TTL: Duration = Duration::from_secs(3600);

/// A complete credential set returned by `authorize_account`.
///
/// The three fields travel together: the token is only valid against the
/// endpoints issued alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub token: String,
    pub api_base: String,
    pub download_base: String,
}

struct CachedEntry {
    creds: Arc<Credentials>,
    expires_at: Instant,
}

/// Caches one credential set and refreshes it on expiry.
///
/// The slot is locked across the whole check-and-refresh sequence, so two
/// callers racing past expiry trigger a single authorize call and both
/// observe the same complete set. Published sets are swapped as one `Arc`;
/// a reader never sees a mix of old and new fields.
pub struct CredentialCache {
    slot: Mutex<Option<CachedEntry>>,
    ttl: Duration,
}

impl CredentialCache {
    pub fn new() -> Self {
        Self::with_ttl(CREDENTIAL_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
        }
    }

    /// Returns the cached credentials, running `fetch` only when the cached
    /// set is missing or expired. A failed fetch caches nothing.
    pub async fn get_or_refresh<F, Fut>(&self, fetch: F) -> Result<Arc<Credentials>, RemoteError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Credentials, RemoteError>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(entry) = slot.as_ref()
            && Instant::now() < entry.expires_at
        {
            return Ok(entry.creds.clone());
        }

        let fresh = Arc::new(fetch().await?);
        debug!(api = %fresh.api_base, "credentials refreshed");
        *slot = Some(CachedEntry {
            creds: fresh.clone(),
            expires_at: Instant::now() + self.ttl,
        });
        Ok(fresh)
    }
}

impl Default for CredentialCache {
    fn default() -> Self {
        Self::new()
    }
}
