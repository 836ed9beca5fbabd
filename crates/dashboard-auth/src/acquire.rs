//! Resilient Handle Acquisition
//!
//! Produces exactly one `Ready(handle)` or `Unavailable` outcome no matter
//! how many call sites ask concurrently. The in-flight resolution is a
//! single shared future; every waiter fans in to the same result. An
//! `Unavailable` outcome is cached until a caller explicitly retries.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tokio::sync::Mutex;

use crate::capability::{first_supported, Capability};
use crate::provider::{AuthProvider, InitOptions, ProviderRegistry};

/// Acquisition tuning
#[derive(Clone, Debug)]
pub struct AcquireConfig {
    /// Max poll cycles waiting for the provider to register itself
    pub max_register_polls: u32,

    /// Interval between registry polls
    pub register_poll_interval: Duration,

    /// Fixed timeout for the provider readiness race
    pub ready_timeout: Duration,

    /// Ranked slot names the provider may register under; the first is
    /// the expected location, the rest are fallbacks
    pub ranked_slots: Vec<String>,

    /// Ranked capability markers, any of which makes a handle usable
    pub usable_capabilities: Vec<Capability>,

    /// Options passed to explicit initialization
    pub init: InitOptions,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            max_register_polls: 20,
            register_poll_interval: Duration::from_millis(250),
            ready_timeout: Duration::from_secs(3),
            ranked_slots: vec!["auth".into(), "auth_v2".into(), "legacy_auth".into()],
            usable_capabilities: vec![
                Capability::FetchIdentity,
                Capability::StartSession,
                Capability::SendCode,
            ],
            init: InitOptions::default(),
        }
    }
}

/// Terminal result of one acquisition, shared by all waiters
#[derive(Clone)]
pub enum HandleOutcome {
    Ready(Arc<dyn AuthProvider>),
    Unavailable,
}

impl HandleOutcome {
    /// The usable handle, if acquisition succeeded
    pub fn handle(&self) -> Option<Arc<dyn AuthProvider>> {
        match self {
            HandleOutcome::Ready(provider) => Some(provider.clone()),
            HandleOutcome::Unavailable => None,
        }
    }
}

impl std::fmt::Debug for HandleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandleOutcome::Ready(_) => write!(f, "Ready"),
            HandleOutcome::Unavailable => write!(f, "Unavailable"),
        }
    }
}

/// Observable acquisition state
#[derive(Clone)]
pub enum HandleState {
    Unresolved,
    Resolving,
    Ready(Arc<dyn AuthProvider>),
    Unavailable,
}

impl std::fmt::Debug for HandleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandleState::Unresolved => write!(f, "Unresolved"),
            HandleState::Resolving => write!(f, "Resolving"),
            HandleState::Ready(_) => write!(f, "Ready"),
            HandleState::Unavailable => write!(f, "Unavailable"),
        }
    }
}

enum SlotState {
    Unresolved,
    Resolving(Shared<BoxFuture<'static, HandleOutcome>>),
    Done(HandleOutcome),
}

/// One-per-process acquirer owning the memoized resolution
pub struct HandleAcquirer {
    registry: Arc<ProviderRegistry>,
    config: AcquireConfig,
    slot: Mutex<SlotState>,
}

impl HandleAcquirer {
    pub fn new(registry: Arc<ProviderRegistry>, config: AcquireConfig) -> Self {
        Self {
            registry,
            config,
            slot: Mutex::new(SlotState::Unresolved),
        }
    }

    pub fn with_defaults(registry: Arc<ProviderRegistry>) -> Self {
        Self::new(registry, AcquireConfig::default())
    }

    /// Current state for observation
    pub async fn state(&self) -> HandleState {
        match &*self.slot.lock().await {
            SlotState::Unresolved => HandleState::Unresolved,
            SlotState::Resolving(_) => HandleState::Resolving,
            SlotState::Done(HandleOutcome::Ready(provider)) => {
                HandleState::Ready(provider.clone())
            }
            SlotState::Done(HandleOutcome::Unavailable) => HandleState::Unavailable,
        }
    }

    /// Acquire the handle, fanning in to any resolution already in flight
    pub async fn acquire(&self) -> HandleOutcome {
        let shared = {
            let mut slot = self.slot.lock().await;
            match &*slot {
                SlotState::Done(outcome) => return outcome.clone(),
                SlotState::Resolving(fut) => fut.clone(),
                SlotState::Unresolved => {
                    let fut = resolve(self.registry.clone(), self.config.clone())
                        .boxed()
                        .shared();
                    *slot = SlotState::Resolving(fut.clone());
                    fut
                }
            }
        };

        let outcome = shared.await;

        let mut slot = self.slot.lock().await;
        if matches!(&*slot, SlotState::Resolving(_)) {
            *slot = SlotState::Done(outcome.clone());
        }
        outcome
    }

    /// Discard a cached `Unavailable` so the next acquire resolves again
    /// (e.g. the user clicked "retry login")
    pub async fn retry(&self) {
        let mut slot = self.slot.lock().await;
        if matches!(&*slot, SlotState::Done(HandleOutcome::Unavailable)) {
            tracing::info!("retrying auth handle acquisition");
            *slot = SlotState::Unresolved;
        }
    }
}

/// The bounded resolution sequence. Every step has its own bounded wait;
/// exhausting them all yields `Unavailable`.
async fn resolve(registry: Arc<ProviderRegistry>, config: AcquireConfig) -> HandleOutcome {
    // Step 1: wait for the module to announce itself at the expected slot.
    if let Some(candidate) = poll_primary_slot(&registry, &config).await {
        // Step 2: explicit initialization; failure means "not yet ready".
        if let Err(err) = candidate.init(&config.init).await {
            tracing::warn!(error = %err, "auth provider init failed, continuing probe");
        }

        // Step 3: ranked capability probe.
        if let Some(capability) = first_supported(candidate.as_ref(), &config.usable_capabilities)
        {
            // Step 4: readiness race against a fixed timeout.
            match tokio::time::timeout(config.ready_timeout, candidate.wait_ready()).await {
                Ok(true) => {
                    tracing::info!(capability = %capability, "auth handle acquired");
                    return HandleOutcome::Ready(candidate);
                }
                Ok(false) => tracing::debug!("auth provider reported not ready"),
                Err(_) => tracing::debug!("auth provider readiness race timed out"),
            }
        } else {
            tracing::debug!("auth provider exposes no usable capability");
        }
    }

    // Step 5: bounded poll of the alternate slots, capability probe per check.
    let alternates: Vec<&str> = config
        .ranked_slots
        .iter()
        .skip(1)
        .map(String::as_str)
        .collect();
    for _ in 0..config.max_register_polls {
        for slot in &alternates {
            if let Some(candidate) = registry.lookup(slot) {
                if let Some(capability) =
                    first_supported(candidate.as_ref(), &config.usable_capabilities)
                {
                    tracing::info!(slot = %slot, capability = %capability, "auth handle acquired from alternate slot");
                    return HandleOutcome::Ready(candidate);
                }
            }
        }
        tokio::time::sleep(config.register_poll_interval).await;
    }

    // Step 6: all bounded waits exhausted.
    tracing::warn!("auth provider unavailable after bounded acquisition");
    HandleOutcome::Unavailable
}

/// Poll the first ranked slot until the provider registers or the poll
/// budget runs out
async fn poll_primary_slot(
    registry: &ProviderRegistry,
    config: &AcquireConfig,
) -> Option<Arc<dyn AuthProvider>> {
    let slot = config.ranked_slots.first()?;
    for _ in 0..config.max_register_polls {
        if let Some(provider) = registry.lookup(slot) {
            return Some(provider);
        }
        tokio::time::sleep(config.register_poll_interval).await;
    }
    tracing::debug!(slot = %slot, "auth provider never registered at primary slot");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuthError, Result};
    use crate::provider::{AuthCall, AuthResponse};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct MockProvider {
        init_calls: AtomicU32,
        init_fails: bool,
        capabilities: Vec<Capability>,
    }

    impl MockProvider {
        fn new(capabilities: Vec<Capability>) -> Self {
            Self {
                init_calls: AtomicU32::new(0),
                init_fails: false,
                capabilities,
            }
        }
    }

    #[async_trait]
    impl AuthProvider for MockProvider {
        fn supports(&self, capability: Capability) -> bool {
            self.capabilities.contains(&capability)
        }

        async fn init(&self, _options: &InitOptions) -> Result<()> {
            self.init_calls.fetch_add(1, Ordering::SeqCst);
            if self.init_fails {
                return Err(AuthError::Init("sdk config rejected".into()));
            }
            Ok(())
        }

        async fn invoke(&self, call: AuthCall) -> Result<AuthResponse> {
            Err(AuthError::Unsupported(call.capability()))
        }
    }

    fn test_config() -> AcquireConfig {
        AcquireConfig {
            max_register_polls: 5,
            register_poll_interval: Duration::from_millis(10),
            ready_timeout: Duration::from_millis(100),
            ..AcquireConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_acquires_initialize_once() {
        let registry = Arc::new(ProviderRegistry::new());
        let provider = Arc::new(MockProvider::new(vec![Capability::FetchIdentity]));
        registry.register("auth", provider.clone());

        let acquirer = Arc::new(HandleAcquirer::new(registry, test_config()));

        let (a, b, c, d) = tokio::join!(
            acquirer.acquire(),
            acquirer.acquire(),
            acquirer.acquire(),
            acquirer.acquire()
        );

        assert!(a.handle().is_some());
        assert!(b.handle().is_some());
        assert!(c.handle().is_some());
        assert!(d.handle().is_some());
        assert_eq!(provider.init_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_registered_yields_unavailable() {
        let registry = Arc::new(ProviderRegistry::new());
        let acquirer = HandleAcquirer::new(registry, test_config());

        let outcome = acquirer.acquire().await;
        assert!(outcome.handle().is_none());
        assert!(matches!(acquirer.state().await, HandleState::Unavailable));

        // Terminal until an explicit retry, even if the provider shows up.
        let outcome = acquirer.acquire().await;
        assert!(outcome.handle().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_clears_cached_unavailable() {
        let registry = Arc::new(ProviderRegistry::new());
        let acquirer = HandleAcquirer::new(registry.clone(), test_config());

        assert!(acquirer.acquire().await.handle().is_none());

        registry.register(
            "auth",
            Arc::new(MockProvider::new(vec![Capability::StartSession])),
        );
        assert!(acquirer.acquire().await.handle().is_none());

        acquirer.retry().await;
        assert!(acquirer.acquire().await.handle().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_alternate_slot_fallback() {
        let registry = Arc::new(ProviderRegistry::new());
        registry.register(
            "legacy_auth",
            Arc::new(MockProvider::new(vec![Capability::FetchIdentity])),
        );

        let acquirer = HandleAcquirer::new(registry, test_config());
        let outcome = acquirer.acquire().await;
        assert!(outcome.handle().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_failure_is_not_fatal() {
        let registry = Arc::new(ProviderRegistry::new());
        let provider = Arc::new(MockProvider {
            init_calls: AtomicU32::new(0),
            init_fails: true,
            capabilities: vec![Capability::FetchIdentity],
        });
        registry.register("auth", provider);

        let acquirer = HandleAcquirer::new(registry, test_config());
        assert!(acquirer.acquire().await.handle().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_capability_less_handle_is_not_usable() {
        let registry = Arc::new(ProviderRegistry::new());
        registry.register("auth", Arc::new(MockProvider::new(vec![])));

        let acquirer = HandleAcquirer::new(registry, test_config());
        assert!(acquirer.acquire().await.handle().is_none());
    }
}
