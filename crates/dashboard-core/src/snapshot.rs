//! Cached Snapshots
//!
//! A snapshot is the last known server truth for one resource kind, plus
//! any optimistic placeholder entries merged in locally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::ResourceEntry;

/// Snapshot of one resource kind for one account
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// Entries, backend-reported plus local placeholders
    pub entries: Vec<ResourceEntry>,

    /// When this snapshot was last fetched or mutated
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Create a snapshot from fetched entries
    pub fn new(entries: Vec<ResourceEntry>) -> Self {
        Self {
            entries,
            fetched_at: Utc::now(),
        }
    }

    /// Empty snapshot (cold cache)
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Total entry count, placeholders included
    pub fn count(&self) -> u32 {
        self.entries.len() as u32
    }

    /// Count of backend-reported entries only
    pub fn authoritative_count(&self) -> u32 {
        self.entries.iter().filter(|e| !e.is_placeholder()).count() as u32
    }

    /// Display keys of all entries (license keys or domain names)
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{EntryStatus, ResourceEntry};

    #[test]
    fn test_counts_separate_placeholders() {
        let mut snapshot = Snapshot::new(vec![
            ResourceEntry::active("lic_1", "AAAA-BBBB"),
            ResourceEntry::active("lic_2", "CCCC-DDDD"),
        ]);
        snapshot.entries.push(ResourceEntry {
            id: "pending".into(),
            label: "Processing...".into(),
            status: EntryStatus::Processing,
            created_at: chrono::Utc::now(),
        });

        assert_eq!(snapshot.count(), 3);
        assert_eq!(snapshot.authoritative_count(), 2);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::empty();
        assert_eq!(snapshot.count(), 0);
        assert_eq!(snapshot.keys().count(), 0);
    }
}
