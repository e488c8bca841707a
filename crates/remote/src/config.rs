use serde::Deserialize;

// Development fallbacks, matched against a local object-store emulator.
const DEV_KEY_ID: &str = "dev-account-key";
const DEV_SECRET: &str = "dev-account-secret";
const DEV_BUCKET_NAME: &str = "skystow-dev";
const DEV_BUCKET_ID: &str = "dev-bucket";
const DEV_API_BASE: &str = "http://127.0.0.1:8900";

/// Object-store account settings.
///
/// `Default` supplies hard-coded local/dev values; production deployments
/// override them through the environment (`SKYSTOW_*`) or the embedding
/// application's own settings layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub key_id: String,
    pub secret: String,
    pub bucket_name: String,
    pub bucket_id: String,
    pub api_base: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            key_id: DEV_KEY_ID.into(),
            secret: DEV_SECRET.into(),
            bucket_name: DEV_BUCKET_NAME.into(),
            bucket_id: DEV_BUCKET_ID.into(),
            api_base: DEV_API_BASE.into(),
        }
    }
}

impl AccountConfig {
    /// Builds the config from `SKYSTOW_*` environment variables, falling
    /// back per-field to the dev defaults.
    pub fn from_env() -> Self {
        let config = Self::from_lookup(|name| std::env::var(name).ok());
        if config.key_id == DEV_KEY_ID || config.secret == DEV_SECRET {
            tracing::warn!("account credentials not configured, using development fallbacks");
        }
        config
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |name: &str, fallback: String| {
            lookup(name).filter(|v| !v.is_empty()).unwrap_or(fallback)
        };
        Self {
            key_id: get("SKYSTOW_KEY_ID", defaults.key_id),
            secret: get("SKYSTOW_SECRET", defaults.secret),
            bucket_name: get("SKYSTOW_BUCKET_NAME", defaults.bucket_name),
            bucket_id: get("SKYSTOW_BUCKET_ID", defaults.bucket_id),
            api_base: get("SKYSTOW_API_BASE", defaults.api_base),
        }
    }
}
