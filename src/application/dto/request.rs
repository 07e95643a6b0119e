//! Request DTOs
//!
//! Data structures for API request bodies.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::shared::validation::validate_password;

/// Register and login request
#[derive(Debug, Deserialize, Validate)]
pub struct UserAuthRequest {
    #[validate(email(message = "Email should be valid"))]
    pub email: String,

    #[validate(custom(function = "validate_password"))]
    pub password: String,
}

/// Delete user request
#[derive(Debug, Deserialize, Validate)]
pub struct UserDeleteRequest {
    pub id: Uuid,
}

/// Existence check request
#[derive(Debug, Deserialize, Validate)]
pub struct UserIsExistRequest {
    #[validate(email(message = "Email should be valid"))]
    pub email: String,
}

/// Send message request
#[derive(Debug, Deserialize, Validate)]
pub struct MessageCreateRequest {
    #[validate(email(message = "Email should be valid"))]
    pub recipient_email: String,

    #[validate(length(min = 1, max = 4096, message = "Text must be 1-4096 characters"))]
    pub text: String,
}
