//! Authenticated Operations
//!
//! Every operation acquires the handle, probes for its capability, then
//! invokes. All failure paths — handle unavailable, capability missing,
//! provider error — come back as a typed [`AuthAttempt`], never a panic.

use std::sync::Arc;

use crate::acquire::HandleAcquirer;
use crate::capability::{first_supported, AuthAttempt, Capability};
use crate::provider::{failure_reason, AuthCall, AuthResponse, Credentials};

/// High-level auth operations over the acquired handle
pub struct AuthService {
    acquirer: Arc<HandleAcquirer>,
}

impl AuthService {
    pub fn new(acquirer: Arc<HandleAcquirer>) -> Self {
        Self { acquirer }
    }

    /// Check whether a session already exists
    pub async fn check_session(&self) -> AuthAttempt {
        self.invoke_probed(&[Capability::FetchIdentity], AuthCall::FetchIdentity)
            .await
    }

    /// Start a session with credentials
    pub async fn login(&self, credentials: Credentials) -> AuthAttempt {
        self.invoke_probed(
            &[Capability::StartSession],
            AuthCall::StartSession { credentials },
        )
        .await
    }

    /// End the current session
    pub async fn logout(&self) -> AuthAttempt {
        self.invoke_probed(&[Capability::EndSession], AuthCall::EndSession)
            .await
    }

    /// Send a one-time code
    pub async fn send_code(&self, destination: impl Into<String>) -> AuthAttempt {
        self.invoke_probed(
            &[Capability::SendCode],
            AuthCall::SendCode {
                destination: destination.into(),
            },
        )
        .await
    }

    /// Verify a one-time code
    pub async fn verify_code(
        &self,
        destination: impl Into<String>,
        code: impl Into<String>,
    ) -> AuthAttempt {
        self.invoke_probed(
            &[Capability::VerifyCode],
            AuthCall::VerifyCode {
                destination: destination.into(),
                code: code.into(),
            },
        )
        .await
    }

    /// Ask the acquirer to drop a cached `Unavailable` outcome
    pub async fn retry_acquisition(&self) {
        self.acquirer.retry().await;
    }

    async fn invoke_probed(&self, ranked: &[Capability], call: AuthCall) -> AuthAttempt {
        let Some(handle) = self.acquirer.acquire().await.handle() else {
            return AuthAttempt::failed("auth provider unavailable");
        };

        let Some(capability) = first_supported(handle.as_ref(), ranked) else {
            return AuthAttempt::failed(format!(
                "provider does not support {}",
                call.capability()
            ));
        };
        tracing::debug!(capability = %capability, "invoking auth operation");

        match handle.invoke(call).await {
            Ok(AuthResponse::Identity(Some(identity)))
            | Ok(AuthResponse::SessionStarted(identity))
            | Ok(AuthResponse::CodeVerified(identity)) => AuthAttempt::with_identity(identity),
            Ok(AuthResponse::Identity(None)) => AuthAttempt::failed("no active session"),
            Ok(AuthResponse::SessionEnded) | Ok(AuthResponse::CodeSent) => {
                AuthAttempt::succeeded()
            }
            Err(err) => AuthAttempt::failed(failure_reason(&err)),
        }
    }
}
