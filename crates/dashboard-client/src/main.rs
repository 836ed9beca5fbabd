//! account-dashboard demo binary
//!
//! Wires the API client, intent store, and reconciliation engine against
//! a running backend. An optional first argument is treated as the query
//! string of a return-from-checkout navigation, e.g.
//! `account-dashboard "success=true&session_id=cs_123"`.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dashboard_auth::{AuthService, HandleAcquirer, ProviderRegistry};
use dashboard_client::{CheckoutSignal, ClientConfig, Dashboard};
use dashboard_core::{ResourceKind, TracingEventSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = ClientConfig::from_env();
    tracing::info!(base_url = %config.base_url, account = %config.account_id, "starting account dashboard");

    // Auth handle acquisition runs before any authenticated operation. In
    // this headless demo no provider registers, so operations degrade to
    // typed failures rather than blocking the dashboard.
    let registry = Arc::new(ProviderRegistry::new());
    let acquirer = Arc::new(HandleAcquirer::with_defaults(registry));
    let auth = AuthService::new(acquirer);

    let session = auth.check_session().await;
    if session.ok {
        tracing::info!(identity = ?session.identity, "active session found");
    } else {
        tracing::warn!(reason = ?session.reason, "no active session");
    }

    let events = Arc::new(TracingEventSink);
    let dashboard = Dashboard::from_config(&config, events)?;

    if let Err(err) = dashboard.load().await {
        tracing::error!(error = %err, "initial load failed");
    }

    // Pick up any intent left behind by a previous run.
    let resumed = dashboard.resume_pending().await;
    if resumed > 0 {
        tracing::info!(loops = resumed, "resumed pending reconciliation");
    }

    // Simulated return navigation, if given.
    if let Some(query) = std::env::args().nth(1) {
        let signal = CheckoutSignal::from_query(&query);
        tracing::info!(signal = ?signal, "processing return navigation");
        dashboard.handle_checkout_return(signal).await;
    }

    // Wait for any active loops before exiting.
    for kind in [ResourceKind::Licenses, ResourceKind::Domains] {
        let state = dashboard.join_reconciliation(kind).await;
        tracing::debug!(kind = %kind, state = ?state, "reconciliation finished");
    }

    Ok(())
}
