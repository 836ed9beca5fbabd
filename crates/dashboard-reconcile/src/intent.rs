//! Purchase Intents
//!
//! An intent records "a purchase was initiated and not yet confirmed". It
//! is created at "pay now", persisted before the external redirect, and
//! consumed exactly once: on convergence, exhaustion, or cancellation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dashboard_core::ResourceKind;

/// A recorded purchase awaiting backend confirmation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PendingIntent {
    LicensePurchase {
        expected_quantity: u32,
        created_at: DateTime<Utc>,
    },
    DomainPurchase {
        /// Raw domain strings, as typed by the user
        expected_domains: Vec<String>,
        expected_count: u32,
        created_at: DateTime<Utc>,
    },
}

impl PendingIntent {
    /// License purchase intent; quantity is clamped to at least 1
    pub fn license(expected_quantity: u32) -> Self {
        Self::LicensePurchase {
            expected_quantity: expected_quantity.max(1),
            created_at: Utc::now(),
        }
    }

    /// Domain purchase intent; the expected count follows the list
    pub fn domains(expected_domains: Vec<String>) -> Self {
        let expected_count = (expected_domains.len() as u32).max(1);
        Self::DomainPurchase {
            expected_domains,
            expected_count,
            created_at: Utc::now(),
        }
    }

    /// The resource kind this intent targets
    pub fn kind(&self) -> ResourceKind {
        match self {
            PendingIntent::LicensePurchase { .. } => ResourceKind::Licenses,
            PendingIntent::DomainPurchase { .. } => ResourceKind::Domains,
        }
    }

    /// Expected number of new resources
    pub fn expected_count(&self) -> u32 {
        match self {
            PendingIntent::LicensePurchase {
                expected_quantity, ..
            } => *expected_quantity,
            PendingIntent::DomainPurchase { expected_count, .. } => *expected_count,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            PendingIntent::LicensePurchase { created_at, .. }
            | PendingIntent::DomainPurchase { created_at, .. } => *created_at,
        }
    }
}

/// Persisted record: the intent plus the pre-purchase baseline count
///
/// The baseline is captured synchronously from the cache at save time and
/// defines the convergence floor: `current >= baseline + expected`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentRecord {
    pub intent: PendingIntent,
    pub baseline: u32,
}

impl IntentRecord {
    pub fn new(intent: PendingIntent, baseline: u32) -> Self {
        Self { intent, baseline }
    }

    pub fn kind(&self) -> ResourceKind {
        self.intent.kind()
    }
}
