//! What the login, registration and OAuth callback views call into.
//!
//! SYSTEM CONTEXT
//! ==============
//! A submission validates input, moves the `AuthAttempt` to `Submitting`,
//! runs the exchange through `AuthClient` (remote, or mock when the backend
//! is unreachable), and on success hands `{token, user}` to the session and
//! navigates to the dashboard. Failures surface one user-facing sentence and
//! return the attempt to `Idle`.
//!
//! A view that goes away calls `unmount()`; any exchange still in flight is
//! then discarded when it resolves, touching neither session nor navigation.

#[cfg(test)]
#[path = "flow_test.rs"]
mod flow_test;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::Url;
use tracing::{debug, info, warn};

use crate::auth::backend::{AuthClient, AuthOutcome, BackendMode};
use crate::guard::{DASHBOARD_PATH, Navigator};
use crate::net::response::ApiResponse;
use crate::net::types::{AuthPayload, GoogleSignInData, User};
use crate::rate_limit::{RateLimitError, RateLimiter};
use crate::state::attempt::{AttemptError, AuthAttempt};
use crate::state::session::SessionStore;
use crate::validate::{self, ValidationError};

pub const MISSING_AUTH_DATA_PATH: &str = "/auth/login?error=missing_auth_data";
pub const GOOGLE_AUTH_FAILED_PATH: &str = "/auth/login?error=google_auth_failed";

/// Base for resolving relative callback locations such as `/auth/google/success?...`.
const CALLBACK_BASE: &str = "http://localhost/";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Busy(#[from] AttemptError),

    #[error(transparent)]
    RateLimited(#[from] RateLimitError),

    #[error("{message}")]
    Rejected { message: String, status_code: u16 },

    #[error("callback is missing the token or user")]
    MissingAuthData,

    #[error("callback user could not be parsed")]
    InvalidCallbackUser,

    #[error("view unmounted before the response arrived")]
    Discarded,
}

#[derive(Clone)]
pub struct AuthFlow {
    auth: AuthClient,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    attempt: AuthAttempt,
    limiter: Option<RateLimiter>,
    mounted: Arc<AtomicBool>,
}

impl std::fmt::Debug for AuthFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFlow")
            .field("attempt", &self.attempt)
            .field("mounted", &self.mounted.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl AuthFlow {
    #[must_use]
    pub fn new(auth: AuthClient, session: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            auth,
            session,
            navigator,
            attempt: AuthAttempt::new(),
            limiter: None,
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Throttle submissions through `limiter`.
    #[must_use]
    pub fn with_rate_limit(mut self, limiter: RateLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn attempt(&self) -> &AuthAttempt {
        &self.attempt
    }

    /// The view went away; late results are dropped.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    // =========================================================================
    // SUBMISSIONS
    // =========================================================================

    /// Email/password sign-in. Returns which backend answered.
    ///
    /// # Errors
    ///
    /// Returns `FlowError` for invalid input, a concurrent submission, a
    /// rate-limit rejection, a failed exchange, or a discarded result.
    pub async fn submit_login(&self, email: &str, password: &str) -> Result<BackendMode, FlowError> {
        let data = validate::validate_login(email, password)?;
        self.submit(|| self.auth.login(&data)).await
    }

    /// Account creation; a blank organization name is omitted.
    ///
    /// # Errors
    ///
    /// Same as `submit_login`.
    pub async fn submit_register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        organization_name: Option<&str>,
    ) -> Result<BackendMode, FlowError> {
        let data = validate::validate_registration(name, email, password, organization_name)?;
        self.submit(|| self.auth.register(&data)).await
    }

    /// Exchange an external identity token for a session.
    ///
    /// # Errors
    ///
    /// Same as `submit_login`.
    pub async fn submit_google(&self, id_token: &str) -> Result<BackendMode, FlowError> {
        let data = GoogleSignInData { id_token: id_token.to_owned() };
        self.submit(|| self.auth.google_sign_in(&data)).await
    }

    async fn submit<F, Fut>(&self, exchange: F) -> Result<BackendMode, FlowError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AuthOutcome>,
    {
        self.attempt.begin()?;

        let outcome = match &self.limiter {
            Some(limiter) => match limiter.call(exchange).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.attempt.fail(e.to_string());
                    return Err(e.into());
                }
            },
            None => exchange().await,
        };

        if !self.is_mounted() {
            debug!("auth result arrived after unmount; discarding");
            self.attempt.reset();
            return Err(FlowError::Discarded);
        }

        match outcome.response {
            ApiResponse::Success { data: AuthPayload { token, user }, .. } => {
                if outcome.mode == BackendMode::Mock {
                    warn!(user_id = %user.id, "signed in against the mock backend");
                }
                self.session.login(user, token);
                self.attempt.succeed();
                self.navigator.navigate(DASHBOARD_PATH);
                Ok(outcome.mode)
            }
            ApiResponse::Failure(failure) => {
                let message = failure.user_message();
                self.attempt.fail(message.clone());
                Err(FlowError::Rejected { message, status_code: failure.status_code })
            }
        }
    }

    // =========================================================================
    // DELEGATED LOGIN
    // =========================================================================

    /// Fetch the delegated-login URL and navigate the browser to it.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Rejected` when the backend gives no URL.
    pub async fn start_google_redirect(&self) -> Result<String, FlowError> {
        self.attempt.begin()?;
        let response = self.auth.google_redirect_url().await;
        if !self.is_mounted() {
            self.attempt.reset();
            return Err(FlowError::Discarded);
        }
        match response {
            ApiResponse::Success { data: url, .. } => {
                self.attempt.reset();
                self.navigator.navigate(&url);
                Ok(url)
            }
            ApiResponse::Failure(failure) => {
                let message = failure.user_message();
                self.attempt.fail(message.clone());
                Err(FlowError::Rejected { message, status_code: failure.status_code })
            }
        }
    }

    /// Finish delegated login from the callback location carrying `token`
    /// and a URL-encoded JSON `user` (single or double encoded). Navigates to the dashboard, or back to
    /// sign-in with an error code.
    ///
    /// # Errors
    ///
    /// Returns `MissingAuthData` or `InvalidCallbackUser`; the matching
    /// sign-in error path has already been navigated to.
    pub fn complete_google_callback(&self, location: &str) -> Result<User, FlowError> {
        let Some((token, user_param)) = callback_params(location) else {
            warn!("oauth callback without token or user");
            self.navigator.navigate(MISSING_AUTH_DATA_PATH);
            return Err(FlowError::MissingAuthData);
        };

        let user = match parse_callback_user(&user_param) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "oauth callback user unparseable");
                self.navigator.navigate(GOOGLE_AUTH_FAILED_PATH);
                return Err(FlowError::InvalidCallbackUser);
            }
        };

        info!(user_id = %user.id, "delegated login completed");
        self.session.login(user.clone(), token);
        self.navigator.navigate(DASHBOARD_PATH);
        Ok(user)
    }
}

/// The callback `user` JSON. Backends that percent-encode the JSON before
/// putting it in the query leave it encoded twice, so a value that is not
/// JSON after query decoding is decoded once more.
fn parse_callback_user(raw: &str) -> Result<User, serde_json::Error> {
    match serde_json::from_str::<User>(raw) {
        Ok(user) => Ok(user),
        Err(e) => match urlencoding::decode(raw) {
            Ok(decoded) if decoded != raw => serde_json::from_str(&decoded),
            _ => Err(e),
        },
    }
}

/// Non-empty `token` and `user` query values, percent-decoded.
fn callback_params(location: &str) -> Option<(String, String)> {
    let url = Url::parse(CALLBACK_BASE).ok()?.join(location).ok()?;
    let mut token = None;
    let mut user = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "token" => token = Some(value.into_owned()),
            "user" => user = Some(value.into_owned()),
            _ => {}
        }
    }
    let token = token.filter(|t| !t.is_empty())?;
    let user = user.filter(|u| !u.is_empty())?;
    Some((token, user))
}
