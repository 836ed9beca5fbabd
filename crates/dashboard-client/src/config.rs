//! Client Configuration

use std::path::PathBuf;

/// Dashboard client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Backend base URL
    pub base_url: String,

    /// Account identity the dashboard shows
    pub account_id: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Where the persisted intent records live
    pub intent_store_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            account_id: "default".into(),
            timeout_secs: 30,
            intent_store_path: PathBuf::from(".dashboard/intents.json"),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url =
            std::env::var("DASHBOARD_API_URL").unwrap_or(defaults.base_url);
        let account_id =
            std::env::var("DASHBOARD_ACCOUNT").unwrap_or(defaults.account_id);
        let timeout_secs = std::env::var("DASHBOARD_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(defaults.timeout_secs);
        let intent_store_path = std::env::var("DASHBOARD_INTENT_STORE")
            .map_or(defaults.intent_store_path, PathBuf::from);

        Self {
            base_url,
            account_id,
            timeout_secs,
            intent_store_path,
        }
    }
}
