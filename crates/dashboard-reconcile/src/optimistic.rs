//! Optimistic Mutator
//!
//! Injects placeholder entries right after purchase intent so the UI shows
//! "something is happening" with zero latency. License kind only: expected
//! domain identity is unknown server-side until confirmed. Placeholders
//! are never deleted explicitly; the next successful refetch replaces the
//! merged view wholesale.

use uuid::Uuid;

use dashboard_core::{AccountId, EntryStatus, ResourceEntry, SnapshotCache};

use crate::intent::PendingIntent;

/// Human-readable label shown in place of the real resource value
const PLACEHOLDER_LABEL: &str = "Processing...";

/// One synthetic placeholder entry
fn placeholder_entry() -> ResourceEntry {
    ResourceEntry {
        id: format!("pending-{}", Uuid::new_v4()),
        label: PLACEHOLDER_LABEL.into(),
        status: EntryStatus::Processing,
        created_at: chrono::Utc::now(),
    }
}

/// Merge placeholders for a fresh intent into the cached snapshot
pub async fn inject_placeholders(
    cache: &SnapshotCache,
    account: &AccountId,
    intent: &PendingIntent,
) {
    let PendingIntent::LicensePurchase {
        expected_quantity, ..
    } = intent
    else {
        return;
    };

    let quantity = *expected_quantity;
    tracing::debug!(quantity = quantity, "injecting license placeholders");
    cache
        .mutate_cached(intent.kind(), account, |snapshot| {
            snapshot
                .entries
                .extend((0..quantity).map(|_| placeholder_entry()));
        })
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dashboard_core::{Result, ResourceKind, Snapshot, SnapshotFetcher};
    use std::sync::Arc;

    struct EmptyFetcher;

    #[async_trait]
    impl SnapshotFetcher for EmptyFetcher {
        async fn fetch_snapshot(
            &self,
            _kind: ResourceKind,
            _account: &AccountId,
        ) -> Result<Snapshot> {
            Ok(Snapshot::empty())
        }
    }

    #[tokio::test]
    async fn test_license_intent_injects_expected_quantity() {
        let cache = SnapshotCache::new(Arc::new(EmptyFetcher));
        let account = AccountId::from_string("acct_1");

        inject_placeholders(&cache, &account, &PendingIntent::license(3)).await;

        let snapshot = cache
            .read_cached(ResourceKind::Licenses, &account)
            .await
            .unwrap();
        assert_eq!(snapshot.count(), 3);
        assert!(snapshot.entries.iter().all(ResourceEntry::is_placeholder));
        assert_eq!(snapshot.authoritative_count(), 0);
    }

    #[tokio::test]
    async fn test_placeholder_ids_are_unique() {
        let cache = SnapshotCache::new(Arc::new(EmptyFetcher));
        let account = AccountId::from_string("acct_1");

        inject_placeholders(&cache, &account, &PendingIntent::license(5)).await;

        let snapshot = cache
            .read_cached(ResourceKind::Licenses, &account)
            .await
            .unwrap();
        let mut ids: Vec<_> = snapshot.entries.iter().map(|e| e.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[tokio::test]
    async fn test_domain_intent_injects_nothing() {
        let cache = SnapshotCache::new(Arc::new(EmptyFetcher));
        let account = AccountId::from_string("acct_1");

        inject_placeholders(
            &cache,
            &account,
            &PendingIntent::domains(vec!["a.com".into()]),
        )
        .await;

        assert!(cache
            .read_cached(ResourceKind::Domains, &account)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_refetch_replaces_placeholders() {
        let cache = SnapshotCache::new(Arc::new(EmptyFetcher));
        let account = AccountId::from_string("acct_1");

        inject_placeholders(&cache, &account, &PendingIntent::license(2)).await;
        cache
            .invalidate_and_refetch(ResourceKind::Licenses, &account)
            .await
            .unwrap();

        let snapshot = cache
            .read_cached(ResourceKind::Licenses, &account)
            .await
            .unwrap();
        assert_eq!(snapshot.count(), 0);
    }
}
