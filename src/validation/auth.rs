use crate::error::{AppError, Result};

/// Checks that login/creation credentials are present.
///
/// # Arguments
///
/// * `username` - The submitted username.
/// * `password` - The submitted password.
///
/// # Returns
///
/// A `Result<()>` indicating whether both fields are present.
pub fn require_credentials(username: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Username or password are missing.".to_string(),
        ));
    }
    Ok(())
}

/// Validates the shape of a new username.
///
/// # Arguments
///
/// * `username` - The username to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the username is valid.
pub fn validate_username(username: &str) -> Result<()> {
    if username.len() > 255 {
        return Err(AppError::Validation(
            "Username must be at most 255 characters.".to_string(),
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AppError::Validation(
            "Username can only contain letters, numbers, underscores, and hyphens.".to_string(),
        ));
    }

    Ok(())
}
