//! Auth Error Types

use thiserror::Error;

use crate::capability::Capability;

/// Result type alias for auth operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// Auth provider errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Provider initialization failed (treated as "not yet ready")
    #[error("Initialization failed: {0}")]
    Init(String),

    /// The handle does not expose the required operation
    #[error("Operation not supported: {0}")]
    Unsupported(Capability),

    /// The provider returned an error for a supported operation
    #[error("Provider error: {0}")]
    Provider(String),

    /// No usable handle could be acquired
    #[error("Auth provider unavailable")]
    Unavailable,
}
