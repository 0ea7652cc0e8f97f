//! Uniform result shape for every backend call.
//!
//! DESIGN
//! ======
//! `ApiResponse<T>` is either `Success { data, status_code }` or a
//! `Failure(ApiFailure)`. The failure schema always carries both `message`
//! (human-readable) and `error` (machine string), so call sites never chain
//! fallbacks. `status_code == 0` marks the network class: no response, or a
//! response whose body could not be understood.

#[cfg(test)]
#[path = "response_test.rs"]
mod response_test;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;

pub const REQUEST_FAILED: &str = "Request failed";
pub const UNABLE_TO_CONNECT: &str = "Unable to connect to server";
pub const UPLOAD_FAILED: &str = "Upload failed";
pub const UNABLE_TO_UPLOAD: &str = "Unable to upload file";
pub const UNEXPECTED_RESPONSE: &str = "Unexpected response from server";

/// Status code used for failures where no usable HTTP response exists.
pub const NETWORK_STATUS: u16 = 0;

// =============================================================================
// FAILURE
// =============================================================================

/// A failed backend call. Both text fields are always populated.
///
/// `has_own_message` is false when `message` is only a generic fallback
/// ("Request failed", "Unable to connect to server", ...) rather than text
/// the responder supplied; `user_message` then uses the status default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiFailure {
    pub message: String,
    pub error: String,
    pub status_code: u16,
    pub has_own_message: bool,
}

impl ApiFailure {
    /// Failure with an explicit message. A blank message counts as none.
    #[must_use]
    pub fn new(status_code: u16, message: impl Into<String>, error: impl Into<String>) -> Self {
        let message = message.into();
        let has_own_message = !message.trim().is_empty();
        Self { message, error: error.into(), status_code, has_own_message }
    }

    /// Network-class failure (`status_code == 0`). `message` is the generic
    /// fallback; `error` describes the underlying cause.
    #[must_use]
    pub fn network(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self { has_own_message: false, ..Self::new(NETWORK_STATUS, message, error) }
    }

    /// Build an HTTP failure from a parsed error body.
    ///
    /// `message` prefers the body's `message`, then `error`; `error` prefers
    /// `error`, then `message`. Missing both yields `fallback` for each.
    #[must_use]
    pub fn from_error_body(status_code: u16, body: &Value, fallback: &str) -> Self {
        let field = |key: &str| {
            body.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        let message_field = field("message");
        let error_field = field("error");
        let message = message_field
            .clone()
            .or_else(|| error_field.clone())
            .unwrap_or_else(|| fallback.to_owned());
        let has_own_message = message_field.is_some() || error_field.is_some();
        let error = error_field.or(message_field).unwrap_or_else(|| fallback.to_owned());
        Self { message, error, status_code, has_own_message }
    }

    pub fn is_network(&self) -> bool {
        self.status_code == NETWORK_STATUS
    }

    /// True for 401/403: the stored credential was rejected.
    pub fn is_session_invalid(&self) -> bool {
        matches!(self.status_code, 401 | 403)
    }

    /// One human-readable sentence: the responder's own message when it sent
    /// one, otherwise the default for the status code.
    pub fn user_message(&self) -> String {
        let own = self.message.trim();
        if self.has_own_message && !own.is_empty() {
            own.to_owned()
        } else {
            default_message(self.status_code).to_owned()
        }
    }
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (status {})", self.user_message(), self.status_code)
    }
}

/// Default sentence for a status code when a failure has no message of its own.
pub fn default_message(status_code: u16) -> &'static str {
    match status_code {
        401 => "Session expired. Please log in again.",
        403 => "Access denied. You don't have permission for this action.",
        404 => "Resource not found.",
        500 => "Server error. Please try again later.",
        NETWORK_STATUS => "Network error. Please check your connection.",
        _ => "An unexpected error occurred.",
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Tagged outcome of one backend call.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiResponse<T> {
    Success { data: T, status_code: u16 },
    Failure(ApiFailure),
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Success { status_code, .. } => *status_code,
            Self::Failure(f) => f.status_code,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(f) => Some(f),
        }
    }

    #[must_use]
    pub fn map<U, F>(self, f: F) -> ApiResponse<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success { data, status_code } => ApiResponse::Success { data: f(data), status_code },
            Self::Failure(failure) => ApiResponse::Failure(failure),
        }
    }

    /// Convert into a `Result`, discarding the success status code.
    ///
    /// # Errors
    ///
    /// Returns the `ApiFailure` for a failed call.
    pub fn into_result(self) -> Result<T, ApiFailure> {
        match self {
            Self::Success { data, .. } => Ok(data),
            Self::Failure(f) => Err(f),
        }
    }
}

impl ApiResponse<Value> {
    /// Decode a successful JSON body into `T`.
    ///
    /// A body that does not match `T` is a malformed response and becomes a
    /// network-class failure.
    #[must_use]
    pub fn decode<T: DeserializeOwned>(self) -> ApiResponse<T> {
        match self {
            Self::Success { data, status_code } => match serde_json::from_value(data) {
                Ok(data) => ApiResponse::Success { data, status_code },
                Err(e) => ApiResponse::Failure(ApiFailure::network(UNEXPECTED_RESPONSE, e.to_string())),
            },
            Self::Failure(f) => ApiResponse::Failure(f),
        }
    }
}

impl<T> From<ApiFailure> for ApiResponse<T> {
    fn from(failure: ApiFailure) -> Self {
        Self::Failure(failure)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponseWire<'a, T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    status_code: u16,
}

/// Serializes as `{ success, data?, message?, error?, statusCode }` for UI layers.
impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Self::Success { data, status_code } => ApiResponseWire {
                success: true,
                data: Some(data),
                message: None,
                error: None,
                status_code: *status_code,
            },
            Self::Failure(f) => ApiResponseWire {
                success: false,
                data: None,
                message: Some(&f.message),
                error: Some(&f.error),
                status_code: f.status_code,
            },
        };
        wire.serialize(serializer)
    }
}
