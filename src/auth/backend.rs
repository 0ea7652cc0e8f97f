//! Backend selection for the authentication exchanges.
//!
//! DESIGN
//! ======
//! `BackendClient` is the auth capability with two implementations,
//! dispatched by enum like the rest of the crate's multi-provider code.
//! `AuthClient` owns one of each and picks per call: the remote backend
//! first, the mock only when the remote call could not reach the host at
//! all. An HTTP rejection from the real backend is never retried against
//! the mock. `pin()` switches to a once-at-startup selection instead.
//!
//! The mode that answered is returned with every outcome and remembered for
//! the status indicator.

#[cfg(test)]
#[path = "backend_test.rs"]
mod backend_test;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

use super::mock::MockAuth;
use super::remote::RemoteAuth;
use crate::config::Config;
use crate::net::gateway::{Gateway, TransportError};
use crate::net::response::{ApiFailure, ApiResponse, UNABLE_TO_CONNECT};
use crate::net::types::{AuthPayload, GoogleSignInData, LoginData, RegisterData};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendMode {
    Remote,
    Mock,
}

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

#[derive(Clone, Debug)]
pub enum BackendClient {
    Remote(RemoteAuth),
    Mock(MockAuth),
}

impl BackendClient {
    pub fn mode(&self) -> BackendMode {
        match self {
            Self::Remote(_) => BackendMode::Remote,
            Self::Mock(_) => BackendMode::Mock,
        }
    }

    /// # Errors
    ///
    /// Returns `TransportError` when the remote backend is unreachable.
    pub async fn login(&self, data: &LoginData) -> Result<ApiResponse<AuthPayload>, TransportError> {
        match self {
            Self::Remote(c) => c.login(data).await,
            Self::Mock(m) => Ok(m.login(data).await),
        }
    }

    /// # Errors
    ///
    /// Returns `TransportError` when the remote backend is unreachable.
    pub async fn register(&self, data: &RegisterData) -> Result<ApiResponse<AuthPayload>, TransportError> {
        match self {
            Self::Remote(c) => c.register(data).await,
            Self::Mock(m) => Ok(m.register(data).await),
        }
    }

    /// # Errors
    ///
    /// Returns `TransportError` when the remote backend is unreachable.
    pub async fn google_sign_in(&self, data: &GoogleSignInData) -> Result<ApiResponse<AuthPayload>, TransportError> {
        match self {
            Self::Remote(c) => c.google_sign_in(data).await,
            Self::Mock(m) => Ok(m.google_sign_in(data).await),
        }
    }
}

// =============================================================================
// AUTH CLIENT
// =============================================================================

/// Result of one auth exchange plus which backend produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthOutcome {
    pub response: ApiResponse<AuthPayload>,
    pub mode: BackendMode,
}

#[derive(Clone, Debug)]
pub struct AuthClient {
    remote: BackendClient,
    mock: BackendClient,
    pinned: Option<BackendMode>,
    degraded: Arc<AtomicBool>,
}

impl AuthClient {
    #[must_use]
    pub fn new(remote: RemoteAuth, mock: MockAuth) -> Self {
        Self {
            remote: BackendClient::Remote(remote),
            mock: BackendClient::Mock(mock),
            pinned: None,
            degraded: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Per-call selection against the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let gateway = Gateway::new(config)?;
        Ok(Self::new(RemoteAuth::new(gateway), MockAuth::new(config.mock_delay)))
    }

    /// Always use `mode`, skipping per-call selection.
    pub fn pin(&mut self, mode: BackendMode) {
        self.pinned = Some(mode);
        self.degraded.store(mode == BackendMode::Mock, Ordering::Relaxed);
    }

    /// Probe `/health` once and pin the result.
    pub async fn select_at_startup(&mut self) -> BackendMode {
        let up = match &self.remote {
            BackendClient::Remote(remote) => remote.gateway().check_health().await,
            BackendClient::Mock(_) => false,
        };
        let mode = if up { BackendMode::Remote } else { BackendMode::Mock };
        self.pin(mode);
        mode
    }

    /// Which backend answered the most recent exchange.
    pub fn last_mode(&self) -> BackendMode {
        if self.degraded.load(Ordering::Relaxed) { BackendMode::Mock } else { BackendMode::Remote }
    }

    /// Delegated-login redirect URL. Remote only; there is no mock stand-in.
    pub async fn google_redirect_url(&self) -> ApiResponse<String> {
        match &self.remote {
            BackendClient::Remote(remote) => remote.google_redirect_url().await,
            BackendClient::Mock(_) => ApiFailure::network(UNABLE_TO_CONNECT, "no remote backend configured").into(),
        }
    }

    pub async fn login(&self, data: &LoginData) -> AuthOutcome {
        self.dispatch("login", |b| b.login(data)).await
    }

    pub async fn register(&self, data: &RegisterData) -> AuthOutcome {
        self.dispatch("register", |b| b.register(data)).await
    }

    pub async fn google_sign_in(&self, data: &GoogleSignInData) -> AuthOutcome {
        self.dispatch("google_sign_in", |b| b.google_sign_in(data)).await
    }

    async fn dispatch<'a, F, Fut>(&'a self, operation: &'static str, op: F) -> AuthOutcome
    where
        F: Fn(&'a BackendClient) -> Fut,
        Fut: Future<Output = Result<ApiResponse<AuthPayload>, TransportError>>,
    {
        let primary = match self.pinned {
            Some(BackendMode::Mock) => &self.mock,
            _ => &self.remote,
        };

        let (response, mode) = match op(primary).await {
            Ok(response) => (response, primary.mode()),
            Err(e) if e.is_unreachable() && primary.mode() == BackendMode::Remote => {
                warn!(operation, error = %e, "backend not available, using mock authentication");
                let response = op(&self.mock)
                    .await
                    .unwrap_or_else(|e| ApiFailure::network(UNABLE_TO_CONNECT, e.to_string()).into());
                (response, BackendMode::Mock)
            }
            Err(e) => {
                warn!(operation, error = %e, "auth request could not be sent");
                (ApiFailure::network(UNABLE_TO_CONNECT, e.to_string()).into(), primary.mode())
            }
        };

        self.degraded.store(mode == BackendMode::Mock, Ordering::Relaxed);
        AuthOutcome { response, mode }
    }
}
