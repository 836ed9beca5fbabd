//! Dashboard Orchestration
//!
//! Wires the cache facade, the intent store, and the reconciliation
//! engine into the flows the page actually runs: initial load, purchase
//! initiation, and return-from-checkout handling.

use std::sync::Arc;

use dashboard_core::{
    AccountId, DashboardEvent, EventSink, ResourceKind, Result, SnapshotCache,
};
use dashboard_reconcile::{
    inject_placeholders, FileIntentStore, IntentRecord, IntentStore, LoopState, PendingIntent,
    ReconcileManager, Reconciler, ReconcilerConfig,
};

use crate::api::{ApiClient, CheckoutRequest, CheckoutSession};
use crate::config::ClientConfig;
use crate::signal::CheckoutSignal;

const KINDS: [ResourceKind; 2] = [ResourceKind::Licenses, ResourceKind::Domains];

/// The account dashboard client
pub struct Dashboard {
    account: AccountId,
    api: Arc<ApiClient>,
    cache: Arc<SnapshotCache>,
    store: Arc<dyn IntentStore>,
    events: Arc<dyn EventSink>,
    manager: ReconcileManager,
}

impl Dashboard {
    /// Wire from explicit parts
    pub fn new(
        account: AccountId,
        api: Arc<ApiClient>,
        cache: Arc<SnapshotCache>,
        store: Arc<dyn IntentStore>,
        events: Arc<dyn EventSink>,
        reconcile: ReconcilerConfig,
    ) -> Self {
        let reconciler = Arc::new(Reconciler::new(
            cache.clone(),
            store.clone(),
            events.clone(),
            reconcile,
        ));
        Self {
            account,
            api,
            cache,
            store,
            events,
            manager: ReconcileManager::new(reconciler),
        }
    }

    /// Production wiring from configuration
    pub fn from_config(config: &ClientConfig, events: Arc<dyn EventSink>) -> Result<Self> {
        let api = Arc::new(ApiClient::new(
            &config.base_url,
            std::time::Duration::from_secs(config.timeout_secs),
        )?);
        let cache = Arc::new(SnapshotCache::new(api.clone()));
        let store: Arc<dyn IntentStore> =
            Arc::new(FileIntentStore::new(&config.intent_store_path));
        let account = AccountId::from_string(config.account_id.clone());

        Ok(Self::new(
            account,
            api,
            cache,
            store,
            events,
            ReconcilerConfig::default(),
        ))
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn cache(&self) -> &Arc<SnapshotCache> {
        &self.cache
    }

    /// Initial data load: prime both resource kinds. A failure here is the
    /// one blocking, user-visible error surface, distinct from
    /// reconciliation.
    pub async fn load(&self) -> Result<()> {
        for kind in KINDS {
            if let Err(err) = self.cache.invalidate_and_refetch(kind, &self.account).await {
                tracing::error!(kind = %kind, error = %err, "initial load failed");
                self.events.emit(DashboardEvent::LoadFailed {
                    message: err.user_message(),
                });
                return Err(err);
            }
        }
        Ok(())
    }

    /// "Pay now" for license keys: returns the checkout redirect target
    pub async fn begin_license_purchase(
        &self,
        quantity: u32,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Result<String> {
        self.begin_purchase(
            PendingIntent::license(quantity),
            success_url.into(),
            cancel_url.into(),
        )
        .await
    }

    /// "Pay now" for domains: returns the checkout redirect target
    pub async fn begin_domain_purchase(
        &self,
        domains: Vec<String>,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Result<String> {
        self.begin_purchase(
            PendingIntent::domains(domains),
            success_url.into(),
            cancel_url.into(),
        )
        .await
    }

    async fn begin_purchase(
        &self,
        intent: PendingIntent,
        success_url: String,
        cancel_url: String,
    ) -> Result<String> {
        let kind = intent.kind();

        // Baseline is captured synchronously from the current snapshot;
        // cold cache means 0. It defines what counts as "new" later.
        let baseline = self.cache.cached_count(kind, &self.account).await;
        let record = IntentRecord::new(intent.clone(), baseline);
        self.store.save(&record);

        inject_placeholders(&self.cache, &self.account, &intent).await;

        let request = checkout_request(&intent, success_url, cancel_url);
        let session: CheckoutSession =
            match self.api.create_checkout(&self.account, request).await {
                Ok(session) => session,
                Err(err) => {
                    // No redirect will happen, so the intent must not
                    // outlive the failed attempt.
                    self.store.clear(kind);
                    return Err(err);
                }
            };

        tracing::info!(kind = %kind, session = %session.id, baseline = baseline, "checkout session created");
        Ok(session.checkout_url)
    }

    /// Handle the return navigation from the external checkout flow
    pub async fn handle_checkout_return(&self, signal: Option<CheckoutSignal>) {
        match signal {
            Some(CheckoutSignal::Cancelled { .. }) => {
                for kind in KINDS {
                    self.store.clear(kind);
                }
                self.events.emit(DashboardEvent::CheckoutCancelled);
            }
            Some(CheckoutSignal::Succeeded { token }) => {
                tracing::debug!(token = ?token, "checkout succeeded, reconciling");
                // A success signal with no stored intent is a valid state
                // (storage cleared, or the user navigated back later);
                // resume_pending simply starts nothing.
                self.resume_pending().await;
            }
            None => {}
        }
    }

    /// Read each kind's persisted record once and start a fresh loop for
    /// it. Returns how many loops were started.
    pub async fn resume_pending(&self) -> u32 {
        let mut started = 0;
        for kind in KINDS {
            if let Some(record) = self.store.load(kind) {
                tracing::info!(kind = %kind, baseline = record.baseline, "resuming pending intent");
                inject_placeholders(&self.cache, &self.account, &record.intent).await;
                self.manager.start(self.account.clone(), record).await;
                started += 1;
            }
        }
        started
    }

    /// Whether a reconciliation loop is running for the kind
    pub async fn is_reconciling(&self, kind: ResourceKind) -> bool {
        self.manager.is_active(kind).await
    }

    /// Wait for the kind's loop to finish
    pub async fn join_reconciliation(&self, kind: ResourceKind) -> LoopState {
        self.manager.join(kind).await
    }

    /// Abort all loops (page teardown)
    pub async fn shutdown(&self) {
        self.manager.shutdown().await;
    }
}

fn checkout_request(
    intent: &PendingIntent,
    success_url: String,
    cancel_url: String,
) -> CheckoutRequest {
    let domains = match intent {
        PendingIntent::DomainPurchase {
            expected_domains, ..
        } => expected_domains.clone(),
        PendingIntent::LicensePurchase { .. } => Vec::new(),
    };
    CheckoutRequest {
        kind: intent.kind(),
        quantity: intent.expected_count(),
        domains,
        success_url,
        cancel_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dashboard_core::{
        MemoryEventSink, ResourceEntry, Snapshot, SnapshotFetcher,
    };
    use dashboard_reconcile::MemoryIntentStore;

    struct FixedFetcher {
        licenses: u32,
    }

    #[async_trait]
    impl SnapshotFetcher for FixedFetcher {
        async fn fetch_snapshot(
            &self,
            kind: ResourceKind,
            _account: &AccountId,
        ) -> dashboard_core::Result<Snapshot> {
            let entries = match kind {
                ResourceKind::Licenses => (0..self.licenses)
                    .map(|i| ResourceEntry::active(format!("lic_{i}"), format!("KEY-{i}")))
                    .collect(),
                ResourceKind::Domains => Vec::new(),
            };
            Ok(Snapshot::new(entries))
        }
    }

    struct TestParts {
        dashboard: Dashboard,
        store: Arc<MemoryIntentStore>,
        events: Arc<MemoryEventSink>,
    }

    fn parts(licenses: u32) -> TestParts {
        let api = Arc::new(
            ApiClient::new(
                "http://127.0.0.1:9",
                std::time::Duration::from_millis(250),
            )
            .unwrap(),
        );
        let cache = Arc::new(SnapshotCache::new(Arc::new(FixedFetcher { licenses })));
        let store = Arc::new(MemoryIntentStore::new());
        let events = Arc::new(MemoryEventSink::new());
        let dashboard = Dashboard::new(
            AccountId::from_string("acct_1"),
            api,
            cache,
            store.clone(),
            events.clone(),
            ReconcilerConfig::default(),
        );
        TestParts {
            dashboard,
            store,
            events,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_with_no_intent_only_notifies() {
        let t = parts(0);

        t.dashboard
            .handle_checkout_return(Some(CheckoutSignal::Cancelled { token: None }))
            .await;

        assert_eq!(t.events.events(), vec![DashboardEvent::CheckoutCancelled]);
        assert!(!t.dashboard.is_reconciling(ResourceKind::Licenses).await);
        assert!(!t.dashboard.is_reconciling(ResourceKind::Domains).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_signal_without_intent_starts_nothing() {
        let t = parts(0);

        t.dashboard
            .handle_checkout_return(Some(CheckoutSignal::Succeeded {
                token: Some("cs_1".into()),
            }))
            .await;

        assert!(t.events.events().is_empty());
        assert!(!t.dashboard.is_reconciling(ResourceKind::Licenses).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_signal_resumes_stored_intent_to_convergence() {
        // Backend already shows the purchased key.
        let t = parts(1);
        t.store
            .save(&IntentRecord::new(PendingIntent::license(1), 0));

        t.dashboard
            .handle_checkout_return(Some(CheckoutSignal::Succeeded { token: None }))
            .await;

        let state = t
            .dashboard
            .join_reconciliation(ResourceKind::Licenses)
            .await;
        assert_eq!(state, LoopState::Converged);
        assert_eq!(
            t.events.events(),
            vec![DashboardEvent::PurchaseConfirmed {
                kind: ResourceKind::Licenses,
                count: 1
            }]
        );
        assert!(t.store.load(ResourceKind::Licenses).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_injects_placeholders_before_polling() {
        let t = parts(0);
        t.store
            .save(&IntentRecord::new(PendingIntent::license(2), 0));

        t.dashboard.resume_pending().await;

        // Placeholders land synchronously, before the first (delayed) cycle.
        let snapshot = t
            .dashboard
            .cache()
            .read_cached(ResourceKind::Licenses, t.dashboard.account())
            .await
            .unwrap();
        assert_eq!(snapshot.count(), 2);
        assert!(snapshot.entries.iter().all(ResourceEntry::is_placeholder));

        t.dashboard.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_checkout_clears_intent() {
        // Nothing listens on the API address, so session creation fails;
        // the persisted intent must not outlive the attempt.
        let t = parts(0);

        let result = t
            .dashboard
            .begin_license_purchase(2, "http://localhost/d?success=true", "http://localhost/d")
            .await;

        assert!(result.is_err());
        assert!(t.store.load(ResourceKind::Licenses).is_none());
    }
}
