//! User-Facing Events
//!
//! Reconciliation never surfaces mid-loop failures; the only user-visible
//! outcomes are the events below.

use crate::resource::ResourceKind;

/// Notifications surfaced to the presentation layer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DashboardEvent {
    /// Backend state satisfied the expected post-purchase delta
    PurchaseConfirmed { kind: ResourceKind, count: u32 },

    /// Confirmation polling exhausted its budget; the purchase is assumed
    /// to have succeeded and will appear once the backend settles
    StillProcessing { kind: ResourceKind },

    /// The user cancelled the external checkout flow
    CheckoutCancelled,

    /// Initial data load failed (blocking error panel)
    LoadFailed { message: String },
}

impl DashboardEvent {
    /// User-facing message text
    pub fn message(&self) -> String {
        match self {
            DashboardEvent::PurchaseConfirmed {
                kind: ResourceKind::Licenses,
                count,
            } => format!("Successfully added {count} license key(s)!"),
            DashboardEvent::PurchaseConfirmed {
                kind: ResourceKind::Domains,
                count,
            } => format!("Successfully added {count} domain(s)!"),
            DashboardEvent::StillProcessing { kind } => {
                format!("Your {kind} purchase is still processing and will appear shortly.")
            }
            DashboardEvent::CheckoutCancelled => "Payment was cancelled.".into(),
            DashboardEvent::LoadFailed { message } => message.clone(),
        }
    }
}

/// Sink for user-facing events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DashboardEvent);
}

/// Sink that logs events through tracing (default wiring)
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: DashboardEvent) {
        match &event {
            DashboardEvent::PurchaseConfirmed { kind, count } => {
                tracing::info!(kind = %kind, count = *count, "{}", event.message());
            }
            DashboardEvent::StillProcessing { kind } => {
                tracing::info!(kind = %kind, "{}", event.message());
            }
            DashboardEvent::CheckoutCancelled => {
                tracing::info!("{}", event.message());
            }
            DashboardEvent::LoadFailed { .. } => {
                tracing::error!("{}", event.message());
            }
        }
    }
}

/// Collecting sink for tests and headless runs
#[derive(Default)]
pub struct MemoryEventSink {
    events: std::sync::Mutex<Vec<DashboardEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events emitted so far, in order
    pub fn events(&self) -> Vec<DashboardEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: DashboardEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmed_message_counts() {
        let event = DashboardEvent::PurchaseConfirmed {
            kind: ResourceKind::Licenses,
            count: 3,
        };
        assert_eq!(event.message(), "Successfully added 3 license key(s)!");
    }

    #[test]
    fn test_memory_sink_collects_in_order() {
        let sink = MemoryEventSink::new();
        sink.emit(DashboardEvent::CheckoutCancelled);
        sink.emit(DashboardEvent::StillProcessing {
            kind: ResourceKind::Domains,
        });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], DashboardEvent::CheckoutCancelled);
    }
}
