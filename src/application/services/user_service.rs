//! User Service
//!
//! Registration, login, listing, existence checks and deletion of user
//! accounts. Registration and deletion hand their lifecycle event to the
//! repository, which commits it to the outbox together with the account
//! change.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::password::{hash_password, verify_password};
use super::token_service::TokenIssuer;
use crate::domain::{
    RoleRepository, RoleType, User, UserDeletedEvent, UserEvent,
    UserRegisteredEvent, UserRepository,
};
use crate::shared::error::{AppError, ErrorCode};

/// User service trait for dependency injection
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create an account and return a signed token for it.
    async fn register(&self, email: &str, password: &str) -> Result<String, UserError>;

    /// Check credentials, rotate the salt and return a fresh token.
    async fn login(&self, email: &str, password: &str) -> Result<String, UserError>;

    /// List every user.
    async fn get_all(&self) -> Result<Vec<UserDto>, UserError>;

    /// Report whether an account with `email` exists.
    async fn is_user_exist(&self, email: &str) -> Result<UserExistence, UserError>;

    /// Delete `target_id` on behalf of `actor_id`.
    async fn delete(&self, actor_id: Uuid, target_id: Uuid) -> Result<(), UserError>;
}

/// User data transfer object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub role: RoleType,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role.role_type,
        }
    }
}

/// Result of an existence check. `user_id` is nil when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserExistence {
    pub user_id: Uuid,
    pub is_existing: bool,
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User with email {0} not found")]
    EmailNotFound(String),

    #[error("User with id {0} not found")]
    IdNotFound(Uuid),

    #[error("User with email {0} already exists")]
    AlreadyExists(String),

    #[error("Invalid password")]
    InvalidPassword,

    #[error("User can not delete themselves")]
    CanNotDeleteThemSelves,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        let (code, message) = match &err {
            UserError::EmailNotFound(_) | UserError::IdNotFound(_) => {
                (ErrorCode::NotFound, "User.NotFound")
            }
            UserError::AlreadyExists(_) => (ErrorCode::BadRequest, "User.AlreadyExists"),
            UserError::InvalidPassword => (ErrorCode::BadRequest, "User.InvalidPassword"),
            UserError::CanNotDeleteThemSelves => (ErrorCode::Conflict, "User.Delete"),
            UserError::Internal(msg) => return AppError::Internal(msg.clone()),
        };

        AppError::Business {
            code,
            message,
            description: err.to_string(),
        }
    }
}

/// UserService implementation
pub struct UserServiceImpl<U, R>
where
    U: UserRepository,
    R: RoleRepository,
{
    user_repo: Arc<U>,
    role_repo: Arc<R>,
    tokens: Arc<TokenIssuer>,
}

impl<U, R> UserServiceImpl<U, R>
where
    U: UserRepository,
    R: RoleRepository,
{
    /// Create a new UserServiceImpl
    pub fn new(user_repo: Arc<U>, role_repo: Arc<R>, tokens: Arc<TokenIssuer>) -> Self {
        Self {
            user_repo,
            role_repo,
            tokens,
        }
    }

    fn issue_token(&self, user: &User) -> Result<String, UserError> {
        self.tokens
            .issue(user)
            .map_err(|e| UserError::Internal(e.to_string()))
    }
}

#[async_trait]
impl<U, R> UserService for UserServiceImpl<U, R>
where
    U: UserRepository + 'static,
    R: RoleRepository + 'static,
{
    async fn register(&self, email: &str, password: &str) -> Result<String, UserError> {
        if self
            .user_repo
            .find_by_email(email)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?
            .is_some()
        {
            tracing::info!("Register user failed: email already exists");
            return Err(UserError::AlreadyExists(email.to_string()));
        }

        // Two first registrations racing may both become Administrator.
        let role_type = if self
            .user_repo
            .has_any()
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?
        {
            RoleType::User
        } else {
            RoleType::Administrator
        };

        let role = self
            .role_repo
            .find_by_type(role_type)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?
            .ok_or_else(|| UserError::Internal(format!("Role {} is not seeded", role_type)))?;

        let hashed = hash_password(password);
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password: hashed.hash,
            salt: hashed.salt,
            role,
        };

        let event = UserEvent::Registered(UserRegisteredEvent {
            id: user.id,
            email: user.email.clone(),
        });

        if !self
            .user_repo
            .create(&user, &event)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?
        {
            tracing::info!("Register user failed: email taken concurrently");
            return Err(UserError::AlreadyExists(email.to_string()));
        }

        tracing::info!(user_id = %user.id, role = %role_type, "Register user");

        self.issue_token(&user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, UserError> {
        let mut user = match self
            .user_repo
            .find_by_email(email)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?
        {
            Some(user) => user,
            None => {
                tracing::info!("Login user failed: user email not found");
                return Err(UserError::EmailNotFound(email.to_string()));
            }
        };

        if !verify_password(password, &user.salt, &user.password) {
            tracing::info!(user_id = %user.id, "Login user failed: invalid password");
            return Err(UserError::InvalidPassword);
        }

        let rotated = hash_password(password);
        self.user_repo
            .update_credentials(user.id, &rotated.hash, &rotated.salt)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?;
        user.password = rotated.hash;
        user.salt = rotated.salt;

        tracing::info!(user_id = %user.id, "Login user");

        self.issue_token(&user)
    }

    async fn get_all(&self) -> Result<Vec<UserDto>, UserError> {
        let users = self
            .user_repo
            .find_all()
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?;

        tracing::debug!(count = users.len(), "Retrieved all users");

        Ok(users.into_iter().map(UserDto::from).collect())
    }

    async fn is_user_exist(&self, email: &str) -> Result<UserExistence, UserError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?;

        Ok(match user {
            Some(user) => UserExistence {
                user_id: user.id,
                is_existing: true,
            },
            None => UserExistence {
                user_id: Uuid::nil(),
                is_existing: false,
            },
        })
    }

    async fn delete(&self, actor_id: Uuid, target_id: Uuid) -> Result<(), UserError> {
        if actor_id == target_id {
            tracing::info!(user_id = %actor_id, "Delete user failed: self-deletion");
            return Err(UserError::CanNotDeleteThemSelves);
        }

        let event = UserEvent::Deleted(UserDeletedEvent { id: target_id });

        if !self
            .user_repo
            .delete(target_id, &event)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?
        {
            return Err(UserError::IdNotFound(target_id));
        }

        tracing::info!(user_id = %target_id, actor_id = %actor_id, "Delete user");

        Ok(())
    }
}
