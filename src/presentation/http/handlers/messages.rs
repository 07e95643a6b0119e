//! Message Handlers

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::application::dto::request::MessageCreateRequest;
use crate::application::dto::response::{MessageResponse, SuccessResponse};
use crate::application::services::MessageService;
use crate::infrastructure::metrics;
use crate::presentation::http::extractors::ValidatedJson;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;

/// Return the caller's unread messages and mark them read
pub async fn get_messages(
    State(messages): State<Arc<dyn MessageService>>,
    auth: AuthUser,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let unread = messages.get_messages(auth.id).await?;

    Ok(Json(unread.into_iter().map(MessageResponse::from).collect()))
}

/// Send a message to a user identified by email
pub async fn send_message(
    State(messages): State<Arc<dyn MessageService>>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<MessageCreateRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let result = messages
        .send_message(auth.id, &body.recipient_email, &body.text)
        .await;
    metrics::record_message_sent(result.is_ok());
    result?;

    Ok(Json(SuccessResponse::ok()))
}
