//! Authentication Middleware
//!
//! Bearer-token validation for protected routes. A verified token becomes an
//! [`AuthUser`] request extension.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use uuid::Uuid;

use crate::application::services::{TokenError, TokenVerifier};
use crate::domain::RoleType;
use crate::shared::error::AppError;

/// Authenticated user extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: RoleType,
}

impl AuthUser {
    /// Fail with 403 unless the caller holds one of `roles`.
    pub fn require_role(&self, roles: &[RoleType]) -> Result<(), AppError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Role {} may not access this resource",
                self.role
            )))
        }
    }
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(verifier): State<Arc<TokenVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Authorization(bearer) = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    let claims = verifier.verify(bearer.token()).map_err(|e| match e {
        TokenError::Expired => AppError::Unauthorized("Token expired".into()),
        _ => AppError::Unauthorized("Invalid token".into()),
    })?;

    // Signed by us but unusable: report missing claims, not a bad token.
    let user = match (claims.user_id(), claims.email.clone(), claims.role_type()) {
        (Some(id), Some(email), Some(role)) => AuthUser { id, email, role },
        _ => return Err(AppError::claims_not_found()),
    };

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
