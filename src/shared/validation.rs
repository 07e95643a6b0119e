//! Validation Utilities

use validator::{ValidationError, ValidationErrors};

use super::error::AppError;

/// Characters accepted in a password.
const PASSWORD_SPECIALS: &str = "@$!%*?&";

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Convert validation errors to AppError
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let message = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let detail = e
                    .message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", field, detail)
            })
        })
        .next()
        .unwrap_or_else(|| "Validation failed".into());

    AppError::Validation(message)
}

/// Password policy: at least eight characters drawn from letters, digits and
/// `@$!%*?&`, with at least one of each class.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c));
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if password.chars().count() >= MIN_PASSWORD_LENGTH
        && allowed
        && has_letter
        && has_digit
        && has_special
    {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_policy");
        err.message = Some(
            "Password should contain letters, digits, and special characters".into(),
        );
        Err(err)
    }
}
