//! Real backend implementation of the auth exchanges.
//!
//! Every method reports transport failures as `Err` so the caller can decide
//! whether to degrade to the mock backend.

#[cfg(test)]
#[path = "remote_test.rs"]
mod remote_test;

use serde::{Deserialize, Serialize};

use crate::net::endpoints;
use crate::net::gateway::{Gateway, RequestOptions, TransportError};
use crate::net::response::{ApiFailure, ApiResponse};
use crate::net::types::{AuthPayload, GoogleSignInData, LoginData, RegisterData};

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const GOOGLE_SIGN_IN_FAILED: &str = "Google sign-in failed";
pub const GOOGLE_REDIRECT_FAILED: &str = "Failed to get Google OAuth URL";
pub const NO_REDIRECT_URL: &str = "No redirect URL received from backend";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleRedirect {
    redirect_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct RemoteAuth {
    gateway: Gateway,
}

impl RemoteAuth {
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// `POST /api/v1/auth/login`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` when the backend could not be reached.
    pub async fn login(&self, data: &LoginData) -> Result<ApiResponse<AuthPayload>, TransportError> {
        self.exchange(endpoints::LOGIN, data, LOGIN_FAILED).await
    }

    /// `POST /api/v1/auth/register`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` when the backend could not be reached.
    pub async fn register(&self, data: &RegisterData) -> Result<ApiResponse<AuthPayload>, TransportError> {
        self.exchange(endpoints::REGISTER, data, REGISTRATION_FAILED).await
    }

    /// `POST /api/v1/auth/google` with the external identity token.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` when the backend could not be reached.
    pub async fn google_sign_in(&self, data: &GoogleSignInData) -> Result<ApiResponse<AuthPayload>, TransportError> {
        self.exchange(endpoints::GOOGLE_SIGN_IN, data, GOOGLE_SIGN_IN_FAILED).await
    }

    /// `GET /api/v1/auth/google/redirect`: where to send the browser for
    /// delegated login. There is no offline stand-in for this one.
    pub async fn google_redirect_url(&self) -> ApiResponse<String> {
        let options = RequestOptions::get().failure_message(GOOGLE_REDIRECT_FAILED);
        match self.gateway.request(endpoints::GOOGLE_REDIRECT, options, None).await.decode::<GoogleRedirect>() {
            ApiResponse::Success { data: GoogleRedirect { redirect_url: Some(url) }, status_code } if !url.is_empty() => {
                ApiResponse::Success { data: url, status_code }
            }
            ApiResponse::Success { status_code, .. } => ApiFailure::new(status_code, NO_REDIRECT_URL, NO_REDIRECT_URL).into(),
            ApiResponse::Failure(f) => f.into(),
        }
    }

    async fn exchange<B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
        failure_message: &'static str,
    ) -> Result<ApiResponse<AuthPayload>, TransportError> {
        let body = serde_json::to_value(body).map_err(|e| TransportError::Body(e.to_string()))?;
        let options = RequestOptions::post().body(body).failure_message(failure_message);
        Ok(self.gateway.send(endpoint, options, None).await?.decode())
    }
}
