//! # dashboard-auth
//!
//! Resilient acquisition of a dynamically loaded auth provider handle.
//!
//! The provider library loads out-of-band, may announce itself under
//! different registry slots depending on load path, and exposes different
//! method sets across versions. This crate turns that into one owned,
//! explicitly lifecycled handle: a bounded, fanned-in acquisition sequence
//! ([`HandleAcquirer`]) plus capability-probed operations
//! ([`AuthService`]) that degrade to typed failures instead of panicking.

pub mod acquire;
pub mod capability;
pub mod error;
pub mod ops;
pub mod provider;

pub use acquire::{AcquireConfig, HandleAcquirer, HandleOutcome, HandleState};
pub use capability::{first_supported, AuthAttempt, Capability, Identity};
pub use error::{AuthError, Result};
pub use ops::AuthService;
pub use provider::{AuthCall, AuthProvider, AuthResponse, Credentials, InitOptions, ProviderRegistry};
