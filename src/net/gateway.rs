//! Backend gateway client: the only code that speaks the backend wire protocol.
//!
//! DESIGN
//! ======
//! `Gateway::send` performs one HTTP exchange and returns
//! `Err(TransportError)` only when no response was obtained at all. Every
//! other outcome (2xx, non-2xx, unreadable body) is folded into an
//! `ApiResponse`. `Gateway::request` goes one step further and folds the
//! transport error too, so ordinary callers never see an error path.
//!
//! `ApiService` layers `get/post/put/delete/upload` on top and forwards the
//! currently bound credential, either a fixed token or whatever the
//! `SessionStore` holds at call time.
//!
//! ERROR HANDLING
//! ==============
//! No retries, no coalescing and no timeout on ordinary calls. Only the
//! health probe is time-bounded.

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::Form;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::response::{
    ApiFailure, ApiResponse, REQUEST_FAILED, UNABLE_TO_CONNECT, UNABLE_TO_UPLOAD, UPLOAD_FAILED,
};
use crate::config::Config;
use crate::state::session::SessionStore;

// =============================================================================
// ERROR
// =============================================================================

/// Failure raised before any response could be turned into an `ApiResponse`.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, timeout, TLS failure, etc.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// A header name or value could not be encoded.
    #[error("invalid header `{name}`")]
    InvalidHeader { name: String },

    /// The request body could not be serialized to JSON.
    #[error("request body could not be serialized: {0}")]
    Body(String),
}

impl TransportError {
    /// True when the backend host could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

// =============================================================================
// REQUEST OPTIONS
// =============================================================================

/// Method, optional JSON body and extra headers for one call.
#[derive(Clone, Debug)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    /// Applied after the defaults, so they override `Content-Type`.
    pub headers: Vec<(String, String)>,
    /// Used for `message`/`error` when an error body carries neither.
    pub failure_message: &'static str,
}

impl RequestOptions {
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self { method, body: None, headers: Vec::new(), failure_message: REQUEST_FAILED }
    }

    #[must_use]
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    #[must_use]
    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    #[must_use]
    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    #[must_use]
    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn failure_message(mut self, message: &'static str) -> Self {
        self.failure_message = message;
        self
    }
}

// =============================================================================
// GATEWAY
// =============================================================================

#[derive(Clone, Debug)]
pub struct Gateway {
    http: reqwest::Client,
    base_url: String,
    health_timeout: Duration,
}

impl Gateway {
    /// Build a gateway for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: crate::config::normalize_base_url(&config.backend_url),
            health_timeout: config.health_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint path such as `/api/v1/auth/login`.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Perform one JSON exchange, surfacing transport failures.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` only when no response was received or the
    /// request could not be built.
    pub async fn send(
        &self,
        endpoint: &str,
        options: RequestOptions,
        credential: Option<&str>,
    ) -> Result<ApiResponse<Value>, TransportError> {
        let headers = build_headers(credential, &options.headers, true)?;
        let mut request = self.http.request(options.method, self.url(endpoint)).headers(headers);
        if let Some(body) = &options.body {
            let bytes = serde_json::to_vec(body).map_err(|e| TransportError::Body(e.to_string()))?;
            request = request.body(bytes);
        }

        let response = request.send().await?;
        Ok(read_response(endpoint, response, options.failure_message, UNABLE_TO_CONNECT).await)
    }

    /// Perform one JSON exchange. Never fails: transport errors become a
    /// network-class `ApiFailure`.
    pub async fn request(&self, endpoint: &str, options: RequestOptions, credential: Option<&str>) -> ApiResponse<Value> {
        match self.send(endpoint, options, credential).await {
            Ok(response) => response,
            Err(e) => {
                warn!(%endpoint, error = %e, "api request failed");
                ApiFailure::network(UNABLE_TO_CONNECT, e.to_string()).into()
            }
        }
    }

    /// `POST` a multipart form. Only `Authorization` is set explicitly; the
    /// transport computes the multipart `Content-Type` with its boundary.
    pub async fn upload(&self, endpoint: &str, form: Form, credential: Option<&str>) -> ApiResponse<Value> {
        let headers = match build_headers(credential, &[], false) {
            Ok(headers) => headers,
            Err(e) => return ApiFailure::network(UNABLE_TO_UPLOAD, e.to_string()).into(),
        };
        let sent = self
            .http
            .post(self.url(endpoint))
            .headers(headers)
            .multipart(form)
            .send()
            .await;
        match sent {
            Ok(response) => read_response(endpoint, response, UPLOAD_FAILED, UNABLE_TO_UPLOAD).await,
            Err(e) => {
                warn!(%endpoint, error = %e, "upload failed");
                ApiFailure::network(UNABLE_TO_UPLOAD, e.to_string()).into()
            }
        }
    }

    /// Probe `GET /health`. Expiry of the health timeout counts as down.
    pub async fn check_health(&self) -> bool {
        let probe = self.http.get(self.url(super::endpoints::HEALTH)).timeout(self.health_timeout).send().await;
        match probe {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "health probe failed");
                false
            }
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn build_headers(
    credential: Option<&str>,
    extra: &[(String, String)],
    json: bool,
) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::new();
    if json {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    if let Some(token) = credential.filter(|t| !t.is_empty()) {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| TransportError::InvalidHeader { name: AUTHORIZATION.to_string() })?;
        headers.insert(AUTHORIZATION, value);
    }
    for (name, value) in extra {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| TransportError::InvalidHeader { name: name.clone() })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| TransportError::InvalidHeader { name: name.clone() })?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

/// Classify a received response. Empty bodies read as JSON `null`; any other
/// non-JSON body is a malformed response and lands in the network class.
async fn read_response(
    endpoint: &str,
    response: reqwest::Response,
    failure_message: &str,
    network_message: &str,
) -> ApiResponse<Value> {
    let status = response.status();
    let status_code = status.as_u16();

    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(%endpoint, error = %e, "response body read failed");
            return ApiFailure::network(network_message, e.to_string()).into();
        }
    };
    let body = match parse_body(&bytes) {
        Ok(body) => body,
        Err(e) => {
            warn!(%endpoint, status = status_code, error = %e, "response body is not JSON");
            return ApiFailure::network(network_message, e.to_string()).into();
        }
    };

    if status.is_success() {
        ApiResponse::Success { data: body, status_code }
    } else {
        debug!(%endpoint, status = status_code, "api request rejected");
        ApiFailure::from_error_body(status_code, &body, failure_message).into()
    }
}

fn parse_body(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes)
}

// =============================================================================
// API SERVICE
// =============================================================================

#[derive(Clone, Debug)]
enum CredentialSource {
    None,
    Token(String),
    Session(SessionStore),
}

/// Method-fixed wrappers over `Gateway::request` bound to one credential source.
#[derive(Clone, Debug)]
pub struct ApiService {
    gateway: Gateway,
    credential: CredentialSource,
}

impl ApiService {
    /// Unauthenticated service.
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway, credential: CredentialSource::None }
    }

    /// Service that reads the credential from `session` on every call.
    #[must_use]
    pub fn with_session(gateway: Gateway, session: SessionStore) -> Self {
        Self { gateway, credential: CredentialSource::Session(session) }
    }

    /// Pin an explicit token, replacing any previous binding.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.credential = CredentialSource::Token(token.into());
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// The credential that the next call will carry.
    pub fn credential(&self) -> Option<String> {
        match &self.credential {
            CredentialSource::None => None,
            CredentialSource::Token(token) => Some(token.clone()),
            CredentialSource::Session(session) => session.current().credential,
        }
        .filter(|t| !t.is_empty())
    }

    pub async fn get(&self, endpoint: &str) -> ApiResponse<Value> {
        self.dispatch(endpoint, RequestOptions::get(), None).await
    }

    pub async fn post(&self, endpoint: &str, data: Option<Value>) -> ApiResponse<Value> {
        self.dispatch(endpoint, RequestOptions::post(), data).await
    }

    pub async fn put(&self, endpoint: &str, data: Option<Value>) -> ApiResponse<Value> {
        self.dispatch(endpoint, RequestOptions::put(), data).await
    }

    pub async fn delete(&self, endpoint: &str) -> ApiResponse<Value> {
        self.dispatch(endpoint, RequestOptions::delete(), None).await
    }

    pub async fn upload(&self, endpoint: &str, form: Form) -> ApiResponse<Value> {
        let credential = self.credential();
        self.gateway.upload(endpoint, form, credential.as_deref()).await
    }

    /// Fully specified request carrying the bound credential.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> ApiResponse<Value> {
        let credential = self.credential();
        self.gateway.request(endpoint, options, credential.as_deref()).await
    }

    /// `request` with `body` serialized as the JSON payload.
    pub async fn request_with<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        options: RequestOptions,
        body: &B,
    ) -> ApiResponse<Value> {
        match serde_json::to_value(body) {
            Ok(body) => self.request(endpoint, options.body(body)).await,
            Err(e) => ApiFailure::network(REQUEST_FAILED, e.to_string()).into(),
        }
    }

    async fn dispatch(&self, endpoint: &str, mut options: RequestOptions, data: Option<Value>) -> ApiResponse<Value> {
        options.body = data;
        self.request(endpoint, options).await
    }
}
