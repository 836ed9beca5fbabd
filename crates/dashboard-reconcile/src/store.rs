//! Persisted Intent Store
//!
//! Durable across a full restart: the external checkout step leaves the
//! process, so the record must be on disk before the redirect. The store
//! is deliberately infallible — a missing or broken backend degrades to
//! "intent always absent", which is benign: the purchase already succeeded
//! server-side, only the follow-up feedback is lost.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use dashboard_core::ResourceKind;

use crate::intent::IntentRecord;

/// Store contract: at most one record per kind, last writer wins
pub trait IntentStore: Send + Sync {
    /// Save or overwrite the record for its kind
    fn save(&self, record: &IntentRecord);

    /// Load the record for a kind, if one is outstanding
    fn load(&self, kind: ResourceKind) -> Option<IntentRecord>;

    /// Consume the record for a kind
    fn clear(&self, kind: ResourceKind);
}

/// In-memory intent store (for tests and headless runs)
#[derive(Default)]
pub struct MemoryIntentStore {
    records: Mutex<HashMap<ResourceKind, IntentRecord>>,
}

impl MemoryIntentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IntentStore for MemoryIntentStore {
    fn save(&self, record: &IntentRecord) {
        let mut records = self.records.lock().unwrap();
        records.insert(record.kind(), record.clone());
    }

    fn load(&self, kind: ResourceKind) -> Option<IntentRecord> {
        let records = self.records.lock().unwrap();
        records.get(&kind).cloned()
    }

    fn clear(&self, kind: ResourceKind) {
        let mut records = self.records.lock().unwrap();
        records.remove(&kind);
    }
}

/// File-backed intent store (one JSON document, atomic replace on write)
pub struct FileIntentStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileIntentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> HashMap<ResourceKind, IntentRecord> {
        let Ok(bytes) = std::fs::read(&self.path) else {
            return HashMap::new();
        };
        match serde_json::from_slice(&bytes) {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "unreadable intent store, treating as empty");
                HashMap::new()
            }
        }
    }

    fn write_all(&self, records: &HashMap<ResourceKind, IntentRecord>) {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), PathBuf::from);

        let result = tempfile::NamedTempFile::new_in(&dir).and_then(|file| {
            serde_json::to_writer_pretty(file.as_file(), records)?;
            file.persist(&self.path).map_err(|e| e.error)?;
            Ok(())
        });

        if let Err(err) = result {
            tracing::warn!(path = %self.path.display(), error = %err, "intent store write failed, continuing without persistence");
        }
    }
}

impl IntentStore for FileIntentStore {
    fn save(&self, record: &IntentRecord) {
        let _guard = self.lock.lock().unwrap();
        let mut records = self.read_all();
        records.insert(record.kind(), record.clone());
        self.write_all(&records);
    }

    fn load(&self, kind: ResourceKind) -> Option<IntentRecord> {
        let _guard = self.lock.lock().unwrap();
        self.read_all().remove(&kind)
    }

    fn clear(&self, kind: ResourceKind) {
        let _guard = self.lock.lock().unwrap();
        let mut records = self.read_all();
        if records.remove(&kind).is_some() {
            self.write_all(&records);
        }
    }
}
