//! API Client
//!
//! JSON client for the dashboard backend. Fetches resource snapshots and
//! creates checkout sessions; the checkout flow itself is a black box that
//! hands back a redirect target.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dashboard_core::{
    AccountId, DashboardError, ResourceEntry, ResourceKind, Result, Snapshot, SnapshotFetcher,
};

/// Dashboard backend client
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::Config(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Create a checkout session and return the redirect target
    pub async fn create_checkout(
        &self,
        account: &AccountId,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession> {
        let url = format!("{}/api/checkout", self.base_url);
        let response = self
            .http
            .post(&url)
            .query(&[("account", account.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| DashboardError::BackendUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DashboardError::Checkout(format!(
                "checkout returned {}",
                response.status()
            )));
        }

        let session: CheckoutSession = response
            .json()
            .await
            .map_err(|e| DashboardError::Parse(e.to_string()))?;

        if session.checkout_url.is_empty() {
            return Err(DashboardError::Checkout("no checkout URL returned".into()));
        }
        Ok(session)
    }

    async fn fetch_entries<P>(&self, path: &str, account: &AccountId) -> Result<Vec<ResourceEntry>>
    where
        P: EntryPayload + serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(&[("account", account.as_str())])
            .send()
            .await
            .map_err(|e| DashboardError::BackendUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DashboardError::Backend(format!(
                "{} returned {}",
                path,
                response.status()
            )));
        }

        let payloads: Vec<P> = response
            .json()
            .await
            .map_err(|e| DashboardError::Parse(e.to_string()))?;

        Ok(payloads.into_iter().map(EntryPayload::into_entry).collect())
    }
}

#[async_trait]
impl SnapshotFetcher for ApiClient {
    async fn fetch_snapshot(&self, kind: ResourceKind, account: &AccountId) -> Result<Snapshot> {
        let entries = match kind {
            ResourceKind::Licenses => {
                self.fetch_entries::<LicensePayload>("/api/licenses", account)
                    .await?
            }
            ResourceKind::Domains => {
                self.fetch_entries::<DomainPayload>("/api/domains", account)
                    .await?
            }
        };
        Ok(Snapshot::new(entries))
    }
}

/// Request to create a checkout session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Resource kind being purchased
    pub kind: ResourceKind,

    /// How many resources the purchase should add
    pub quantity: u32,

    /// Domains being registered (empty for license purchases)
    #[serde(default)]
    pub domains: Vec<String>,

    /// URL to redirect after successful payment
    pub success_url: String,

    /// URL to redirect if checkout is cancelled
    pub cancel_url: String,
}

/// Result of creating a checkout session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Backend session identifier (opaque correlation token)
    pub id: String,

    /// URL to redirect the user to
    pub checkout_url: String,
}

trait EntryPayload: Sized {
    fn into_entry(self) -> ResourceEntry;
}

#[derive(Debug, Deserialize)]
struct LicensePayload {
    id: String,
    key: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl EntryPayload for LicensePayload {
    fn into_entry(self) -> ResourceEntry {
        let mut entry = ResourceEntry::active(self.id, self.key);
        if let Some(created_at) = self.created_at {
            entry.created_at = created_at;
        }
        entry
    }
}

#[derive(Debug, Deserialize)]
struct DomainPayload {
    id: String,
    domain: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl EntryPayload for DomainPayload {
    fn into_entry(self) -> ResourceEntry {
        let mut entry = ResourceEntry::active(self.id, self.domain);
        if let Some(created_at) = self.created_at {
            entry.created_at = created_at;
        }
        entry
    }
}
