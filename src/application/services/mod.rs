//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **UserService**: Registration, login, listing and deletion of users
//! - **MessageService**: Sending messages and reading the inbox
//! - **TokenIssuer / TokenVerifier**: RS256 JWT signing and validation
//! - **password**: PBKDF2 hashing with per-user salts

pub mod message_service;
pub mod password;
pub mod token_service;
pub mod user_service;

// Re-export user service types
pub use user_service::{UserDto, UserError, UserExistence, UserService, UserServiceImpl};

// Re-export message service types
pub use message_service::{MessageError, MessageService, MessageServiceImpl};

// Re-export token service types
pub use token_service::{Claims, TokenError, TokenIssuer, TokenVerifier};
