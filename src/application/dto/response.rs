//! Response DTOs
//!
//! Data structures for API response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::application::services::{UserDto, UserExistence};
use crate::domain::{Message, RoleType};

/// Token returned by register and login
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Plain success acknowledgement
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// User response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub role: RoleType,
}

impl From<UserDto> for UserResponse {
    fn from(dto: UserDto) -> Self {
        Self {
            id: dto.id,
            email: dto.email,
            role: dto.role,
        }
    }
}

/// Current user id response
#[derive(Debug, Serialize)]
pub struct CurrentUserIdResponse {
    pub user_id: Uuid,
}

/// Existence check response
#[derive(Debug, Serialize)]
pub struct UserExistingResponse {
    pub user_id: Uuid,
    pub is_existing: bool,
}

impl From<UserExistence> for UserExistingResponse {
    fn from(existence: UserExistence) -> Self {
        Self {
            user_id: existence.user_id,
            is_existing: existence.is_existing,
        }
    }
}

/// Inbox entry
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub sender_id: Uuid,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            sender_id: message.sender_id,
            text: message.text,
            sent_at: message.sent_at,
        }
    }
}
