use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SESSION_COOKIE: &str = "lakbay_session";

pub const MIN_PASSWORD_CHARS: usize = 8;
/// bcrypt ignores everything past 72 bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;
pub const MAX_DISPLAY_NAME_CHARS: usize = 64;
pub const MAX_EMAIL_CHARS: usize = 254;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session: Option<SessionUser>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Display name is required")]
    EmptyDisplayName,
    #[error("Display name must be at most 64 characters")]
    DisplayNameTooLong,
    #[error("Enter a valid email address")]
    InvalidEmail,
    #[error("Password must be at least 8 characters")]
    PasswordTooShort,
    #[error("Password must be at most 72 bytes")]
    PasswordTooLong,
    #[error("Password does not match")]
    PasswordMismatch,
}

/// Emails are compared and stored trimmed and lowercased.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn validate_email(raw: &str) -> Result<(), RegistrationError> {
    let email = raw.trim();
    if email.is_empty() || email.chars().count() > MAX_EMAIL_CHARS {
        return Err(RegistrationError::InvalidEmail);
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(RegistrationError::InvalidEmail);
    };
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.chars().any(char::is_whitespace);
    if local.is_empty() || local.chars().any(char::is_whitespace) || !domain_ok {
        return Err(RegistrationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), RegistrationError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(RegistrationError::PasswordTooShort);
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(RegistrationError::PasswordTooLong);
    }
    Ok(())
}

/// Checks run by both the register form and the server.
pub fn validate_registration(request: &RegisterRequest) -> Result<(), RegistrationError> {
    let display_name = request.display_name.trim();
    if display_name.is_empty() {
        return Err(RegistrationError::EmptyDisplayName);
    }
    if display_name.chars().count() > MAX_DISPLAY_NAME_CHARS {
        return Err(RegistrationError::DisplayNameTooLong);
    }
    validate_email(&request.email)?;
    validate_password(&request.password)
}
