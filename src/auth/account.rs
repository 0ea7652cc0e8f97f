//! Profile and API-key operations for the signed-in user.
//!
//! DESIGN
//! ======
//! Every call goes through `ApiService`, so the credential is whatever the
//! session holds at call time. Responses are unwrapped from their envelopes
//! (`{user}`, `{apiKey}`, `{apiKeys}`, `{message}`) before they reach the
//! caller. None of these calls have a mock stand-in.
//!
//! Two calls also update local state on success: a profile rename is
//! written back into the session, and a generated key's raw value is kept in
//! the `ApiKeyRing` so it can be revoked later.

#[cfg(test)]
#[path = "account_test.rs"]
mod account_test;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::info;

use crate::net::endpoints;
use crate::net::gateway::{ApiService, RequestOptions};
use crate::net::response::ApiResponse;
use crate::net::types::{ApiKey, ApiKeyData, UpdateProfileData, UserProfile};
use crate::state::api_keys::ApiKeyRing;
use crate::state::session::SessionStore;
use crate::validate::{self, ValidationError};

pub const FETCH_PROFILE_FAILED: &str = "Failed to fetch profile";
pub const UPDATE_PROFILE_FAILED: &str = "Failed to update profile";
pub const GENERATE_KEY_FAILED: &str = "Failed to generate API key";
pub const LIST_KEYS_FAILED: &str = "Failed to fetch API keys";
pub const REVOKE_KEY_FAILED: &str = "Failed to revoke API key";
pub const KEY_REVOKED: &str = "API key revoked successfully";

#[derive(Deserialize)]
struct ProfileEnvelope {
    user: UserProfile,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedKeyEnvelope {
    api_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyListEnvelope {
    #[serde(default)]
    api_keys: Vec<ApiKey>,
}

#[derive(Deserialize)]
struct MessageEnvelope {
    message: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AccountClient {
    api: ApiService,
}

impl AccountClient {
    #[must_use]
    pub fn new(api: ApiService) -> Self {
        Self { api }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
        failure_message: &'static str,
    ) -> ApiResponse<T> {
        self.api.request(endpoint, options.failure_message(failure_message)).await.decode()
    }

    async fn call_with<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
        body: &B,
        failure_message: &'static str,
    ) -> ApiResponse<T> {
        self.api.request_with(endpoint, options.failure_message(failure_message), body).await.decode()
    }

    /// `GET /api/v1/auth/profile`.
    pub async fn profile(&self) -> ApiResponse<UserProfile> {
        self.call::<ProfileEnvelope>(endpoints::PROFILE, RequestOptions::get(), FETCH_PROFILE_FAILED)
            .await
            .map(|envelope| envelope.user)
    }

    /// `PUT /api/v1/auth/profile`.
    pub async fn update_profile(&self, data: &UpdateProfileData) -> ApiResponse<UserProfile> {
        self.call_with::<_, ProfileEnvelope>(endpoints::PROFILE, RequestOptions::put(), data, UPDATE_PROFILE_FAILED)
            .await
            .map(|envelope| envelope.user)
    }

    /// Rename the signed-in user and keep the session's identity in step.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingName` for a blank name.
    pub async fn update_display_name(
        &self,
        session: &SessionStore,
        name: &str,
    ) -> Result<ApiResponse<UserProfile>, ValidationError> {
        let display_name = validate::validate_name(name)?;
        let response = self.update_profile(&UpdateProfileData { display_name }).await;

        if let Some(profile) = response.data() {
            let current = session.current();
            if let (Some(mut identity), Some(credential)) = (current.identity, current.credential) {
                identity.display_name.clone_from(&profile.display_name);
                session.login(identity, credential);
            }
        }
        Ok(response)
    }

    /// `POST /api/v1/auth/api-keys`; the raw key is remembered in `ring`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingName` for a blank key name.
    pub async fn generate_api_key(&self, ring: &ApiKeyRing, name: &str) -> Result<ApiResponse<String>, ValidationError> {
        let name = validate::validate_name(name)?;
        let body = ApiKeyData { name: name.clone() };
        let response = self
            .call_with::<_, GeneratedKeyEnvelope>(endpoints::API_KEYS, RequestOptions::post(), &body, GENERATE_KEY_FAILED)
            .await
            .map(|envelope| envelope.api_key);

        if let Some(raw_key) = response.data() {
            ring.remember(&name, raw_key);
            info!(key_name = %name, "api key generated");
        }
        Ok(response)
    }

    /// `GET /api/v1/auth/api-keys`.
    pub async fn list_api_keys(&self) -> ApiResponse<Vec<ApiKey>> {
        self.call::<KeyListEnvelope>(endpoints::API_KEYS, RequestOptions::get(), LIST_KEYS_FAILED)
            .await
            .map(|envelope| envelope.api_keys)
    }

    /// `DELETE /api/v1/auth/api-keys` with the raw key in the body. Success
    /// carries the backend's message, or a default one.
    pub async fn revoke_api_key(&self, raw_key: &str) -> ApiResponse<String> {
        let options = RequestOptions::delete().body(json!({ "key": raw_key }));
        self.api
            .request(endpoints::API_KEYS, options.failure_message(REVOKE_KEY_FAILED))
            .await
            .map(|body| {
                serde_json::from_value::<MessageEnvelope>(body)
                    .ok()
                    .and_then(|envelope| envelope.message)
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| KEY_REVOKED.to_owned())
            })
    }

    /// Revoke a key by name using the raw value kept in `ring`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NotRevocable` when the key was not generated
    /// from this installation.
    pub async fn revoke_api_key_by_name(
        &self,
        ring: &ApiKeyRing,
        name: &str,
    ) -> Result<ApiResponse<String>, ValidationError> {
        let Some(raw_key) = ring.raw_key(name) else {
            return Err(ValidationError::NotRevocable { name: name.to_owned() });
        };
        let response = self.revoke_api_key(&raw_key).await;
        if response.is_success() {
            ring.forget(name);
            info!(key_name = %name, "api key revoked");
        }
        Ok(response)
    }
}
