//! Cache Access Facade
//!
//! Keyed, invalidatable store of the last known server truth. The
//! reconciler and the optimistic mutator only ever touch snapshots through
//! this facade; the network side is behind the `SnapshotFetcher` seam.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::resource::{AccountId, ResourceKind};
use crate::snapshot::Snapshot;

/// Strategy trait for fetching fresh snapshots from the backend
///
/// Implemented by the HTTP API client in production and by stubs in tests.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    /// Fetch the current server truth for one resource kind. Idempotent.
    async fn fetch_snapshot(&self, kind: ResourceKind, account: &AccountId) -> Result<Snapshot>;
}

/// Keyed snapshot cache with invalidate-and-refetch
pub struct SnapshotCache {
    fetcher: Arc<dyn SnapshotFetcher>,
    snapshots: RwLock<HashMap<(ResourceKind, AccountId), Snapshot>>,
}

impl SnapshotCache {
    pub fn new(fetcher: Arc<dyn SnapshotFetcher>) -> Self {
        Self {
            fetcher,
            snapshots: RwLock::new(HashMap::new()),
        }
    }

    /// Local read of the cached snapshot. No network.
    pub async fn read_cached(&self, kind: ResourceKind, account: &AccountId) -> Option<Snapshot> {
        let snapshots = self.snapshots.read().await;
        snapshots.get(&(kind, account.clone())).cloned()
    }

    /// Local transform of the cached snapshot.
    ///
    /// A cold cache is seeded with an empty snapshot first, so optimistic
    /// entries can be merged before any fetch has happened.
    pub async fn mutate_cached<F>(&self, kind: ResourceKind, account: &AccountId, f: F)
    where
        F: FnOnce(&mut Snapshot),
    {
        let mut snapshots = self.snapshots.write().await;
        let snapshot = snapshots
            .entry((kind, account.clone()))
            .or_insert_with(Snapshot::empty);
        f(snapshot);
        snapshot.fetched_at = chrono::Utc::now();
    }

    /// Invalidate the cached snapshot and refetch it from the backend.
    ///
    /// The fresh result wholly replaces the cached view, placeholders
    /// included. On fetch failure the previous snapshot stays in place;
    /// the error is returned for the caller's retry accounting.
    pub async fn invalidate_and_refetch(
        &self,
        kind: ResourceKind,
        account: &AccountId,
    ) -> Result<()> {
        let fresh = self.fetcher.fetch_snapshot(kind, account).await?;
        let mut snapshots = self.snapshots.write().await;
        snapshots.insert((kind, account.clone()), fresh);
        Ok(())
    }

    /// Current entry count for a kind, 0 when the cache is cold
    pub async fn cached_count(&self, kind: ResourceKind, account: &AccountId) -> u32 {
        self.read_cached(kind, account)
            .await
            .map_or(0, |s| s.count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::resource::ResourceEntry;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct StubFetcher {
        calls: AtomicU32,
        fail: bool,
    }

    #[async_trait]
    impl SnapshotFetcher for StubFetcher {
        async fn fetch_snapshot(
            &self,
            _kind: ResourceKind,
            _account: &AccountId,
        ) -> Result<Snapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DashboardError::Backend("boom".into()));
            }
            Ok(Snapshot::new(vec![ResourceEntry::active("lic_1", "KEY-1")]))
        }
    }

    #[tokio::test]
    async fn test_refetch_replaces_cached_view() {
        let fetcher = Arc::new(StubFetcher {
            calls: AtomicU32::new(0),
            fail: false,
        });
        let cache = SnapshotCache::new(fetcher.clone());
        let account = AccountId::from_string("acct_1");

        cache
            .mutate_cached(ResourceKind::Licenses, &account, |s| {
                s.entries.push(ResourceEntry::active("temp", "TEMP"));
                s.entries.push(ResourceEntry::active("temp2", "TEMP2"));
            })
            .await;
        assert_eq!(cache.cached_count(ResourceKind::Licenses, &account).await, 2);

        cache
            .invalidate_and_refetch(ResourceKind::Licenses, &account)
            .await
            .unwrap();

        // Wholly replaced, not merged
        assert_eq!(cache.cached_count(ResourceKind::Licenses, &account).await, 1);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_previous_snapshot() {
        let cache = SnapshotCache::new(Arc::new(StubFetcher {
            calls: AtomicU32::new(0),
            fail: true,
        }));
        let account = AccountId::from_string("acct_1");

        cache
            .mutate_cached(ResourceKind::Domains, &account, |s| {
                s.entries.push(ResourceEntry::active("dom_1", "a.com"));
            })
            .await;

        let result = cache
            .invalidate_and_refetch(ResourceKind::Domains, &account)
            .await;
        assert!(result.is_err());
        assert_eq!(cache.cached_count(ResourceKind::Domains, &account).await, 1);
    }

    #[tokio::test]
    async fn test_cold_cache_reads_none() {
        let cache = SnapshotCache::new(Arc::new(StubFetcher {
            calls: AtomicU32::new(0),
            fail: false,
        }));
        let account = AccountId::from_string("acct_1");

        assert!(cache
            .read_cached(ResourceKind::Licenses, &account)
            .await
            .is_none());
        assert_eq!(cache.cached_count(ResourceKind::Licenses, &account).await, 0);
    }
}
