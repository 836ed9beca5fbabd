//! Return-From-Checkout Signal
//!
//! The external checkout flow redirects back with a succeeded/cancelled
//! flag and an opaque correlation token in the navigation query
//! parameters. Absence of both flags means an ordinary navigation.

/// Outcome signalled by the checkout return navigation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutSignal {
    Succeeded { token: Option<String> },
    Cancelled { token: Option<String> },
}

impl CheckoutSignal {
    /// Parse from a query string (`success=true&session_id=cs_123`).
    /// A leading `?` is tolerated.
    pub fn from_query(query: &str) -> Option<Self> {
        let mut succeeded = false;
        let mut cancelled = false;
        let mut token = None;

        for pair in query.trim_start_matches('?').split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "success" if is_truthy(value) => succeeded = true,
                "cancelled" | "canceled" if is_truthy(value) => cancelled = true,
                "session_id" | "token" if !value.is_empty() => {
                    token = Some(value.to_string());
                }
                _ => {}
            }
        }

        // Cancellation wins if the backend ever sends both.
        if cancelled {
            Some(CheckoutSignal::Cancelled { token })
        } else if succeeded {
            Some(CheckoutSignal::Succeeded { token })
        } else {
            None
        }
    }

    /// The opaque correlation token, when present
    pub fn token(&self) -> Option<&str> {
        match self {
            CheckoutSignal::Succeeded { token } | CheckoutSignal::Cancelled { token } => {
                token.as_deref()
            }
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value, "true" | "1")
}
