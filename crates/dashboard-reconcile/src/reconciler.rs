//! Bounded Polling Reconciler
//!
//! Drives a pending intent to resolution: each cycle invalidates and
//! refetches the cached snapshot, waits for it to settle, then compares
//! against the expected post-purchase delta. The loop is an explicit state
//! machine with one owned retry counter; cycles are strictly sequential,
//! and a cycle failure is absorbed into the retry budget, never surfaced
//! mid-loop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use dashboard_core::{
    AccountId, DashboardEvent, EventSink, ResourceKind, Snapshot, SnapshotCache,
};

use crate::intent::{IntentRecord, PendingIntent};
use crate::matcher::matched_count;
use crate::store::IntentStore;

/// Reconciliation timing contract
#[derive(Clone, Debug)]
pub struct ReconcilerConfig {
    /// Maximum poll cycles before the loop exhausts
    pub max_cycles: u32,

    /// Interval between cycles
    pub cycle_interval: Duration,

    /// Delay before the first cycle, giving the backend time to process
    /// the external payment callback
    pub initial_delay: Duration,

    /// Delay between refetch and read, to avoid a half-updated cache
    pub settle_delay: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            max_cycles: 30,
            cycle_interval: Duration::from_secs(10),
            initial_delay: Duration::from_secs(5),
            settle_delay: Duration::from_millis(500),
        }
    }
}

/// Loop states. `Scheduled` owns the retry counter; `InFlight` is one
/// network round trip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Scheduled { cycle: u32 },
    InFlight { cycle: u32 },
    Converged,
    Exhausted,
    Cancelled,
}

impl LoopState {
    /// Whether the loop has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoopState::Converged | LoopState::Exhausted | LoopState::Cancelled
        )
    }
}

/// The reconciliation engine for one cache + store pair
pub struct Reconciler {
    cache: Arc<SnapshotCache>,
    store: Arc<dyn IntentStore>,
    events: Arc<dyn EventSink>,
    config: ReconcilerConfig,
}

impl Reconciler {
    pub fn new(
        cache: Arc<SnapshotCache>,
        store: Arc<dyn IntentStore>,
        events: Arc<dyn EventSink>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            cache,
            store,
            events,
            config,
        }
    }

    /// Drive one intent to a terminal state
    pub async fn run(&self, account: &AccountId, record: IntentRecord) -> LoopState {
        let kind = record.kind();
        let mut state = LoopState::Scheduled { cycle: 1 };

        loop {
            match state {
                LoopState::Scheduled { cycle } => {
                    let delay = if cycle == 1 {
                        self.config.initial_delay
                    } else {
                        self.config.cycle_interval
                    };
                    tokio::time::sleep(delay).await;

                    // The stored intent governs the loop. A newer intent of
                    // the same kind (or a cleared record) means this loop is
                    // superseded and must exit as a no-op.
                    match self.store.load(kind) {
                        Some(stored) if stored == record => {}
                        _ => {
                            tracing::debug!(kind = %kind, "intent superseded or already handled");
                            state = LoopState::Cancelled;
                            continue;
                        }
                    }

                    state = LoopState::InFlight { cycle };
                }

                LoopState::InFlight { cycle } => {
                    let converged = self.run_cycle(account, &record, cycle).await;

                    state = if converged {
                        self.store.clear(kind);
                        self.events.emit(DashboardEvent::PurchaseConfirmed {
                            kind,
                            count: record.intent.expected_count(),
                        });
                        LoopState::Converged
                    } else if cycle >= self.config.max_cycles {
                        // Not an error: the purchase is assumed to have
                        // succeeded; only confirmation timed out.
                        tracing::info!(kind = %kind, cycles = cycle, "retry budget exhausted");
                        self.store.clear(kind);
                        self.events.emit(DashboardEvent::StillProcessing { kind });
                        LoopState::Exhausted
                    } else {
                        LoopState::Scheduled { cycle: cycle + 1 }
                    };
                }

                terminal => return terminal,
            }
        }
    }

    /// One cycle: invalidate and refetch, settle, read, compare. Any
    /// failure counts as a non-convergent cycle.
    async fn run_cycle(&self, account: &AccountId, record: &IntentRecord, cycle: u32) -> bool {
        let kind = record.kind();
        tracing::debug!(kind = %kind, cycle = cycle, "reconciliation cycle");

        if let Err(err) = self.cache.invalidate_and_refetch(kind, account).await {
            tracing::debug!(kind = %kind, cycle = cycle, error = %err, "refetch failed, counting against retry budget");
            return false;
        }

        tokio::time::sleep(self.config.settle_delay).await;

        // Only snapshots produced by a successful refetch are compared, so
        // optimistic placeholders never count toward convergence.
        let Some(snapshot) = self.cache.read_cached(kind, account).await else {
            return false;
        };
        is_converged(record, &snapshot)
    }
}

/// Convergence test per intent kind
fn is_converged(record: &IntentRecord, snapshot: &Snapshot) -> bool {
    match &record.intent {
        PendingIntent::LicensePurchase {
            expected_quantity, ..
        } => snapshot.count() >= record.baseline + expected_quantity,

        PendingIntent::DomainPurchase {
            expected_domains,
            expected_count,
            ..
        } => {
            // Backend keys may not look like what the user typed, so a
            // raw count increase over the baseline also converges.
            let keys: Vec<&str> = snapshot.keys().collect();
            matched_count(expected_domains, &keys) >= *expected_count
                || snapshot.count() > record.baseline
        }
    }
}

/// One reconciliation loop per resource kind; starting a new one
/// supersedes the previous loop instead of duplicating it.
pub struct ReconcileManager {
    reconciler: Arc<Reconciler>,
    active: Mutex<HashMap<ResourceKind, JoinHandle<LoopState>>>,
}

impl ReconcileManager {
    pub fn new(reconciler: Arc<Reconciler>) -> Self {
        Self {
            reconciler,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Start (or supersede) the loop for the record's kind
    pub async fn start(&self, account: AccountId, record: IntentRecord) {
        let kind = record.kind();
        let mut active = self.active.lock().await;

        if let Some(previous) = active.remove(&kind) {
            if !previous.is_finished() {
                tracing::debug!(kind = %kind, "superseding active reconciliation loop");
            }
            previous.abort();
        }

        let reconciler = self.reconciler.clone();
        let handle = tokio::spawn(async move { reconciler.run(&account, record).await });
        active.insert(kind, handle);
    }

    /// Whether a loop for the kind is still running
    pub async fn is_active(&self, kind: ResourceKind) -> bool {
        let active = self.active.lock().await;
        active.get(&kind).is_some_and(|h| !h.is_finished())
    }

    /// Wait for the kind's loop to finish and return its terminal state.
    /// `Idle` when no loop was started; an aborted loop reports
    /// `Cancelled`.
    pub async fn join(&self, kind: ResourceKind) -> LoopState {
        let handle = self.active.lock().await.remove(&kind);
        match handle {
            None => LoopState::Idle,
            Some(handle) => handle.await.unwrap_or(LoopState::Cancelled),
        }
    }

    /// Abort every running loop (process teardown)
    pub async fn shutdown(&self) {
        let mut active = self.active.lock().await;
        for (_, handle) in active.drain() {
            handle.abort();
        }
    }
}
