//! User Handlers

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::application::dto::request::{UserAuthRequest, UserDeleteRequest, UserIsExistRequest};
use crate::application::dto::response::{
    CurrentUserIdResponse, SuccessResponse, TokenResponse, UserExistingResponse, UserResponse,
};
use crate::application::services::UserService;
use crate::domain::RoleType;
use crate::infrastructure::metrics;
use crate::presentation::http::extractors::ValidatedJson;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;

/// Roles allowed to browse users
const MEMBER_ROLES: &[RoleType] = &[RoleType::Administrator, RoleType::User];

/// Register a new user
pub async fn register(
    State(users): State<Arc<dyn UserService>>,
    ValidatedJson(body): ValidatedJson<UserAuthRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let result = users.register(&body.email, &body.password).await;
    metrics::record_registration(result.is_ok());

    Ok(Json(TokenResponse { token: result? }))
}

/// Login with credentials
pub async fn login(
    State(users): State<Arc<dyn UserService>>,
    ValidatedJson(body): ValidatedJson<UserAuthRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let result = users.login(&body.email, &body.password).await;
    metrics::record_login(result.is_ok());

    Ok(Json(TokenResponse { token: result? }))
}

/// List all users
pub async fn get_all(
    State(users): State<Arc<dyn UserService>>,
    auth: AuthUser,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    auth.require_role(MEMBER_ROLES)?;

    let all = users.get_all().await?;

    Ok(Json(all.into_iter().map(UserResponse::from).collect()))
}

/// Id of the caller, taken from the token
pub async fn get_current_user_id(auth: AuthUser) -> Result<Json<CurrentUserIdResponse>, AppError> {
    auth.require_role(MEMBER_ROLES)?;

    Ok(Json(CurrentUserIdResponse { user_id: auth.id }))
}

/// Delete another user (administrators only)
pub async fn delete(
    State(users): State<Arc<dyn UserService>>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<UserDeleteRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    auth.require_role(&[RoleType::Administrator])?;

    users.delete(auth.id, body.id).await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Check whether an account exists for an email
pub async fn is_user_exist(
    State(users): State<Arc<dyn UserService>>,
    _auth: AuthUser,
    ValidatedJson(body): ValidatedJson<UserIsExistRequest>,
) -> Result<Json<UserExistingResponse>, AppError> {
    let existence = users.is_user_exist(&body.email).await?;

    Ok(Json(existence.into()))
}
