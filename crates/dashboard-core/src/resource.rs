//! Resource Model
//!
//! Account-owned resources as reported by the backend: license keys and
//! registered domains.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique account identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kinds of purchasable account resources
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Licenses,
    Domains,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Licenses => "licenses",
            ResourceKind::Domains => "domains",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Entry lifecycle status
///
/// `Processing` marks locally synthesized placeholders; backend entries
/// arrive as `Active`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Active,
    Processing,
}

/// A single account-owned resource entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceEntry {
    /// Backend identifier, or a synthetic uuid for placeholders
    pub id: String,

    /// Display value (license key or domain name)
    pub label: String,

    /// Lifecycle status
    pub status: EntryStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl ResourceEntry {
    /// Create an active entry as reported by the backend
    pub fn active(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            status: EntryStatus::Active,
            created_at: Utc::now(),
        }
    }

    /// Whether this entry is a non-authoritative local placeholder
    pub fn is_placeholder(&self) -> bool {
        self.status == EntryStatus::Processing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_as_str() {
        assert_eq!(ResourceKind::Licenses.as_str(), "licenses");
        assert_eq!(ResourceKind::Domains.as_str(), "domains");
    }

    #[test]
    fn test_active_entry_is_not_placeholder() {
        let entry = ResourceEntry::active("lic_1", "AAAA-BBBB-CCCC-DDDD");
        assert!(!entry.is_placeholder());
    }
}
