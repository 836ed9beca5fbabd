//! # dashboard-client
//!
//! Backend API client and orchestration for the account dashboard.
//!
//! [`Dashboard`] owns the full flow: initial load through the cache
//! facade, purchase initiation (baseline capture, intent persistence,
//! optimistic placeholders, checkout session creation), and
//! return-from-checkout handling that hands pending intents to the
//! reconciliation engine.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod signal;

pub use api::{ApiClient, CheckoutRequest, CheckoutSession};
pub use config::ClientConfig;
pub use dashboard::Dashboard;
pub use signal::CheckoutSignal;
