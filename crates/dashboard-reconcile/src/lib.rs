//! # dashboard-reconcile
//!
//! The post-checkout reconciliation engine. After the user returns from an
//! external payment redirect there is no webhook or push channel; the only
//! way to learn whether the purchase landed is to poll the backend and
//! compare against the expected delta.
//!
//! Pieces, leaves first:
//!
//! - [`PendingIntent`] / [`IntentRecord`] — the durable "purchase was
//!   initiated" record plus its pre-purchase baseline count
//! - [`IntentStore`] — persistence contract, survives a full restart
//! - [`inject_placeholders`] — optimistic cache entries for zero-latency
//!   feedback
//! - [`domains_match`] — permissive domain key matching
//! - [`Reconciler`] / [`ReconcileManager`] — the bounded polling state
//!   machine, one loop per resource kind

pub mod intent;
pub mod matcher;
pub mod optimistic;
pub mod reconciler;
pub mod store;

pub use intent::{IntentRecord, PendingIntent};
pub use matcher::{domains_match, matched_count};
pub use optimistic::inject_placeholders;
pub use reconciler::{LoopState, ReconcileManager, Reconciler, ReconcilerConfig};
pub use store::{FileIntentStore, IntentStore, MemoryIntentStore};
