//! Application Error Types
//!
//! Centralized error handling with Axum integration. Every error leaves the
//! process as a `{code, message, description}` JSON body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Stable machine-readable error code carried in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    BadGateway,
    Internal,
}

impl ErrorCode {
    /// HTTP status the code is rendered with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::BadGateway => StatusCode::BAD_GATEWAY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A named business failure produced by a service.
    #[error("{message}: {description}")]
    Business {
        code: ErrorCode,
        message: &'static str,
        description: String,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

impl AppError {
    /// Token was valid but did not carry a usable id/email/role.
    pub fn claims_not_found() -> Self {
        AppError::Business {
            code: ErrorCode::Conflict,
            message: "User.Claims",
            description: "User claims not found".into(),
        }
    }

    /// Code this error is rendered with.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Business { code, .. } => *code,
            AppError::Unauthorized(_) => ErrorCode::Unauthorized,
            AppError::Forbidden(_) => ErrorCode::Forbidden,
            AppError::Validation(_) => ErrorCode::BadRequest,
            AppError::BadGateway(_) => ErrorCode::BadGateway,
            AppError::Internal(_) | AppError::Database(_) | AppError::Redis(_) => {
                ErrorCode::Internal
            }
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
    pub description: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (message, description) = match self {
            AppError::Business {
                message,
                description,
                ..
            } => (message.to_string(), description),
            AppError::Unauthorized(msg) => ("Auth.Unauthorized".into(), msg),
            AppError::Forbidden(msg) => ("Auth.Forbidden".into(), msg),
            AppError::Validation(msg) => ("Request.Validation".into(), msg),
            AppError::BadGateway(msg) => {
                tracing::warn!("Upstream failure: {}", msg);
                ("Gateway.Upstream".into(), "Upstream service not responding".into())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Server.Internal".into(), "Internal server error".into())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                ("Server.Internal".into(), "Internal server error".into())
            }
            AppError::Redis(e) => {
                tracing::error!("Redis error: {}", e);
                ("Server.Internal".into(), "Internal server error".into())
            }
        };

        let body = ErrorResponse {
            code,
            message,
            description,
        };

        (code.status(), Json(body)).into_response()
    }
}
