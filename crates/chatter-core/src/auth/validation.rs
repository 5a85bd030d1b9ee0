//! Registration input checks, run before anything touches storage.

use chatter_types::error::AuthError;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 32;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 128;

/// Trim and validate a username. Returns the trimmed form.
pub fn validate_username(raw: &str) -> Result<String, AuthError> {
    let username = raw.trim();
    let len = username.chars().count();

    if len < USERNAME_MIN_LEN || len > USERNAME_MAX_LEN {
        return Err(AuthError::InvalidUsername(format!(
            "must be between {USERNAME_MIN_LEN} and {USERNAME_MAX_LEN} characters"
        )));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(AuthError::InvalidUsername(
            "may only contain letters, digits, '_', '.' and '-'".to_string(),
        ));
    }

    Ok(username.to_string())
}

/// Validate a password's length. Passwords are never trimmed.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    let len = password.chars().count();
    if len < PASSWORD_MIN_LEN || len > PASSWORD_MAX_LEN {
        return Err(AuthError::InvalidPassword(format!(
            "must be between {PASSWORD_MIN_LEN} and {PASSWORD_MAX_LEN} characters"
        )));
    }
    Ok(())
}
