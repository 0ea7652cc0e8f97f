//! Backend endpoint paths.

pub const LOGIN: &str = "/api/v1/auth/login";
pub const REGISTER: &str = "/api/v1/auth/register";
pub const GOOGLE_SIGN_IN: &str = "/api/v1/auth/google";
pub const GOOGLE_REDIRECT: &str = "/api/v1/auth/google/redirect";
pub const PROFILE: &str = "/api/v1/auth/profile";
pub const API_KEYS: &str = "/api/v1/auth/api-keys";
pub const ORGANIZATIONS: &str = "/api/v1/organizations";
pub const HEALTH: &str = "/health";

/// Ids are percent-encoded so they stay a single path segment.
pub fn organization(org_id: &str) -> String {
    format!("{ORGANIZATIONS}/{}", urlencoding::encode(org_id))
}

pub fn organization_members(org_id: &str) -> String {
    format!("{ORGANIZATIONS}/{}/members", urlencoding::encode(org_id))
}

#[cfg(test)]
#[path = "endpoints_test.rs"]
mod endpoints_test;
