//! # dashboard-core
//!
//! Core model for the account dashboard client: account resources
//! (license keys, domains), cached snapshots, the cache access facade,
//! and the user-facing event surface.
//!
//! The cache facade is the single seam between local state and the
//! backend: everything above it (reconciler, optimistic mutator,
//! orchestration) reads and mutates snapshots only through
//! [`SnapshotCache`], and the network lives behind [`SnapshotFetcher`].

pub mod cache;
pub mod error;
pub mod events;
pub mod resource;
pub mod snapshot;

pub use cache::{SnapshotCache, SnapshotFetcher};
pub use error::{DashboardError, Result};
pub use events::{DashboardEvent, EventSink, MemoryEventSink, TracingEventSink};
pub use resource::{AccountId, EntryStatus, ResourceEntry, ResourceKind};
pub use snapshot::Snapshot;
