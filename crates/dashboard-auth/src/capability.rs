//! Capability Probes
//!
//! The provider's method surface varies across versions and load paths, so
//! nothing is invoked without a runtime probe first. A ranked list of
//! equivalent capabilities replaces per-operation fallback chains.

use serde::{Deserialize, Serialize};

use crate::provider::AuthProvider;

/// One operation the provider handle may or may not expose
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    FetchIdentity,
    StartSession,
    EndSession,
    SendCode,
    VerifyCode,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::FetchIdentity => "fetch_identity",
            Capability::StartSession => "start_session",
            Capability::EndSession => "end_session",
            Capability::SendCode => "send_code",
            Capability::VerifyCode => "verify_code",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// First capability from a ranked list the handle actually exposes
pub fn first_supported(provider: &dyn AuthProvider, ranked: &[Capability]) -> Option<Capability> {
    ranked.iter().copied().find(|c| provider.supports(*c))
}

/// Resolved identity of the signed-in user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
}

/// Typed outcome of an authenticated operation
///
/// The handle's method surface is not statically guaranteed, so dependent
/// operations report failure as data instead of panicking or propagating.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthAttempt {
    pub ok: bool,
    pub identity: Option<Identity>,
    pub reason: Option<String>,
}

impl AuthAttempt {
    pub fn succeeded() -> Self {
        Self {
            ok: true,
            identity: None,
            reason: None,
        }
    }

    pub fn with_identity(identity: Identity) -> Self {
        Self {
            ok: true,
            identity: Some(identity),
            reason: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            identity: None,
            reason: Some(reason.into()),
        }
    }
}
