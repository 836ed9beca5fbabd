//! Auth Provider Handle
//!
//! The provider library loads out-of-band and announces itself in a
//! process-wide registry under one of several known slot names (load path
//! decides which). The registry is the only place acquisition looks.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::capability::{Capability, Identity};
use crate::error::{AuthError, Result};

/// Initialization options (session durability)
#[derive(Clone, Debug)]
pub struct InitOptions {
    /// Keep the session across restarts
    pub persist_session: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            persist_session: true,
        }
    }
}

/// Credentials for starting a session
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: Option<String>,
}

/// One call against the provider
#[derive(Clone, Debug)]
pub enum AuthCall {
    FetchIdentity,
    StartSession { credentials: Credentials },
    EndSession,
    SendCode { destination: String },
    VerifyCode { destination: String, code: String },
}

impl AuthCall {
    /// The capability this call requires
    pub fn capability(&self) -> Capability {
        match self {
            AuthCall::FetchIdentity => Capability::FetchIdentity,
            AuthCall::StartSession { .. } => Capability::StartSession,
            AuthCall::EndSession => Capability::EndSession,
            AuthCall::SendCode { .. } => Capability::SendCode,
            AuthCall::VerifyCode { .. } => Capability::VerifyCode,
        }
    }
}

/// Provider response for a successful call
#[derive(Clone, Debug)]
pub enum AuthResponse {
    /// Current identity, `None` when no session exists
    Identity(Option<Identity>),
    SessionStarted(Identity),
    SessionEnded,
    CodeSent,
    CodeVerified(Identity),
}

/// The capability surface of a loaded auth provider
///
/// Method sets differ between provider versions, so callers must probe
/// with [`supports`](AuthProvider::supports) before invoking.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Probe for a single optional operation
    fn supports(&self, capability: Capability) -> bool;

    /// Explicit initialization with configuration. An error here means
    /// "not yet ready", never a fatal acquisition failure.
    async fn init(&self, options: &InitOptions) -> Result<()>;

    /// Readiness signal. Providers without one resolve immediately; the
    /// acquirer races this against a fixed timeout either way.
    async fn wait_ready(&self) -> bool {
        true
    }

    /// Invoke one operation. Callers probe first; an unsupported call
    /// still returns a typed error rather than panicking.
    async fn invoke(&self, call: AuthCall) -> Result<AuthResponse>;
}

/// Process-wide registry of provider slots
///
/// The loader registers the provider under whichever slot name its load
/// path dictates; acquisition polls a ranked list of those names.
#[derive(Default)]
pub struct ProviderRegistry {
    slots: RwLock<HashMap<String, Arc<dyn AuthProvider>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Announce a provider under a slot name (last writer wins)
    pub fn register(&self, slot: impl Into<String>, provider: Arc<dyn AuthProvider>) {
        let slot = slot.into();
        tracing::debug!(slot = %slot, "auth provider registered");
        self.slots.write().unwrap().insert(slot, provider);
    }

    /// Look up a provider by slot name
    pub fn lookup(&self, slot: &str) -> Option<Arc<dyn AuthProvider>> {
        self.slots.read().unwrap().get(slot).cloned()
    }
}

/// Map a provider error into a human-readable failure reason
pub(crate) fn failure_reason(err: &AuthError) -> String {
    match err {
        AuthError::Unsupported(capability) => {
            format!("provider does not support {capability}")
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullProvider;

    #[async_trait]
    impl AuthProvider for NullProvider {
        fn supports(&self, _capability: Capability) -> bool {
            false
        }

        async fn init(&self, _options: &InitOptions) -> Result<()> {
            Ok(())
        }

        async fn invoke(&self, call: AuthCall) -> Result<AuthResponse> {
            Err(AuthError::Unsupported(call.capability()))
        }
    }

    #[test]
    fn test_registry_last_writer_wins() {
        let registry = ProviderRegistry::new();
        registry.register("auth", Arc::new(NullProvider));
        registry.register("auth", Arc::new(NullProvider));
        assert!(registry.lookup("auth").is_some());
        assert!(registry.lookup("legacy_auth").is_none());
    }

    #[test]
    fn test_call_capability_mapping() {
        assert_eq!(AuthCall::FetchIdentity.capability(), Capability::FetchIdentity);
        assert_eq!(AuthCall::EndSession.capability(), Capability::EndSession);
    }
}
