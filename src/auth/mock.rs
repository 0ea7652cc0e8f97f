//! In-process mock backend used when the real backend is unreachable.
//!
//! SYSTEM CONTEXT
//! ==============
//! Exists only so the login screens stay usable without a live backend.
//! Registrations live in a transient list that dies with the process, and
//! every token issued here carries `MOCK_TOKEN_PREFIX` so a mock session can
//! always be told apart from a real one.

#[cfg(test)]
#[path = "mock_test.rs"]
mod mock_test;

use std::fmt::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::Rng;
use uuid::Uuid;

use crate::net::response::{ApiFailure, ApiResponse};
use crate::net::types::{AuthPayload, GoogleSignInData, LoginData, RegisterData, User};

pub const MOCK_TOKEN_PREFIX: &str = "mock_jwt_";

pub const USER_NOT_FOUND: &str = "User not found. Please register first.";
pub const INVALID_PASSWORD: &str = "Invalid password";
pub const USER_EXISTS: &str = "User with this email already exists";

#[derive(Clone, Debug)]
struct MockUser {
    id: String,
    display_name: String,
    email: String,
    password: String,
    organization_id: Option<String>,
}

impl MockUser {
    fn identity(&self) -> User {
        User {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            organization_id: self.organization_id.clone(),
            role: None,
            is_email_verified: None,
            created_at: None,
        }
    }
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Fabricate an opaque mock token: `mock_jwt_<unix millis>_<16 hex chars>`.
#[must_use]
pub fn generate_mock_token() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let bytes: [u8; 8] = rand::rng().random();
    format!("{MOCK_TOKEN_PREFIX}{millis}_{}", bytes_to_hex(&bytes))
}

/// Mock auth backend. Clones share one user list.
#[derive(Clone, Debug)]
pub struct MockAuth {
    users: Arc<Mutex<Vec<MockUser>>>,
    delay: Duration,
}

impl MockAuth {
    /// `delay` simulates network latency before every answer.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { users: Arc::new(Mutex::new(Vec::new())), delay }
    }

    fn users(&self) -> std::sync::MutexGuard<'_, Vec<MockUser>> {
        self.users.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    pub fn registered_count(&self) -> usize {
        self.users().len()
    }

    pub async fn login(&self, data: &LoginData) -> ApiResponse<AuthPayload> {
        self.simulate_latency().await;

        let users = self.users();
        let Some(user) = users.iter().find(|u| u.email == data.email) else {
            return ApiFailure::new(404, USER_NOT_FOUND, USER_NOT_FOUND).into();
        };
        if user.password != data.password {
            return ApiFailure::new(401, INVALID_PASSWORD, INVALID_PASSWORD).into();
        }

        ApiResponse::Success {
            data: AuthPayload { token: generate_mock_token(), user: user.identity() },
            status_code: 200,
        }
    }

    pub async fn register(&self, data: &RegisterData) -> ApiResponse<AuthPayload> {
        self.simulate_latency().await;

        let mut users = self.users();
        if users.iter().any(|u| u.email == data.email) {
            return ApiFailure::new(409, USER_EXISTS, USER_EXISTS).into();
        }

        let user = MockUser {
            id: format!("user_{}", Uuid::new_v4().simple()),
            display_name: data.name.clone(),
            email: data.email.clone(),
            password: data.password.clone(),
            organization_id: None,
        };
        let identity = user.identity();
        users.push(user);

        ApiResponse::Success {
            data: AuthPayload { token: generate_mock_token(), user: identity },
            status_code: 201,
        }
    }

    /// Accepts any external token and signs in a fixed placeholder user.
    pub async fn google_sign_in(&self, _data: &GoogleSignInData) -> ApiResponse<AuthPayload> {
        self.simulate_latency().await;

        let user = User {
            id: format!("google_user_{}", Uuid::new_v4().simple()),
            display_name: "Google User".to_owned(),
            email: "google@example.com".to_owned(),
            organization_id: None,
            role: None,
            is_email_verified: None,
            created_at: None,
        };
        ApiResponse::Success { data: AuthPayload { token: generate_mock_token(), user }, status_code: 200 }
    }
}

impl Default for MockAuth {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}
