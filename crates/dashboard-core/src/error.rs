//! Error Types

use thiserror::Error;

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Dashboard error types
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Backend request failed (network, timeout, 5xx)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Backend unavailable or not responding
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Auth provider handle could not be acquired
    #[error("Auth handle unavailable: {0}")]
    HandleUnavailable(String),

    /// Persisted state could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Checkout session could not be created
    #[error("Checkout error: {0}")]
    Checkout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parse error (wire payloads, navigation parameters)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl DashboardError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DashboardError::Backend(_)
                | DashboardError::BackendUnavailable(_)
                | DashboardError::Storage(_)
                | DashboardError::Io(_)
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Backend(_) | DashboardError::BackendUnavailable(_) => {
                "The dashboard service is currently unavailable. Please try again.".into()
            }
            DashboardError::HandleUnavailable(_) => {
                "Sign-in is currently unavailable. Please retry.".into()
            }
            DashboardError::Checkout(_) => {
                "The checkout session could not be started. Please try again.".into()
            }
            DashboardError::Config(_) => "Service configuration error.".into(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for DashboardError {
    fn from(err: anyhow::Error) -> Self {
        DashboardError::Other(err.to_string())
    }
}
