//! Input checks performed before any request is dispatched.
//!
//! Failures here never reach the gateway; the caller shows them inline.

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;

use crate::net::types::{LoginData, RegisterData};
use crate::state::api_keys::NOT_REVOCABLE;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Email is required")]
    MissingEmail,

    #[error("Password is required")]
    MissingPassword,

    #[error("Name is required")]
    MissingName,

    #[error("{}", NOT_REVOCABLE)]
    NotRevocable { name: String },
}

/// Trimmed, non-empty email plus a non-empty password.
///
/// # Errors
///
/// Returns the first missing field.
pub fn validate_login(email: &str, password: &str) -> Result<LoginData, ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if password.is_empty() {
        return Err(ValidationError::MissingPassword);
    }
    Ok(LoginData { email: email.to_owned(), password: password.to_owned() })
}

/// Login checks plus a required name. A blank organization name is omitted.
///
/// # Errors
///
/// Returns the first missing field.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    organization_name: Option<&str>,
) -> Result<RegisterData, ValidationError> {
    let name = validate_name(name)?;
    let LoginData { email, password } = validate_login(email, password)?;
    let organization_name = organization_name.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned);
    Ok(RegisterData { name, email, password, organization_name })
}

/// Trimmed, non-empty display or key name.
///
/// # Errors
///
/// Returns `MissingName` for a blank name.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingName);
    }
    Ok(name.to_owned())
}
