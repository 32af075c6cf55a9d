//! Conversation HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/messages - Fetch the conversation history
//! - POST   /api/messages - Send a message and receive the assistant reply
//! - DELETE /api/messages - Clear the conversation

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use parley_core::conversation::service::EMPTY_MESSAGE;
use parley_types::conversation::{Message, MessageRole};

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for sending a message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub success: bool,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub success: bool,
    pub messages: Vec<Message>,
    pub last_message: LastMessage,
}

#[derive(Debug, Serialize)]
pub struct LastMessage {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: &'static str,
}

/// GET /api/messages - Return every message in insertion order.
pub async fn get_messages(
    State(state): State<AppState>,
) -> Result<Json<MessagesResponse>, AppError> {
    let conversation = state
        .conversations
        .get_or_create()
        .await
        .map_err(|e| AppError::internal("Failed to fetch messages", e))?;

    Ok(Json(MessagesResponse {
        success: true,
        messages: conversation.messages,
    }))
}

/// POST /api/messages - Append the user's message and the assistant reply.
///
/// A body that is not `{"message": "<string>"}` is treated like an empty
/// message. If the client disconnects mid-request, the in-flight provider
/// call is cancelled and nothing is persisted.
pub async fn send_message(
    State(state): State<AppState>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>, AppError> {
    let Json(request) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected message body");
        AppError::Validation(EMPTY_MESSAGE.to_string())
    })?;

    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let exchange = state
        .conversations
        .append_exchange(&request.message, &cancel)
        .await
        .map_err(|e| AppError::from_chat(e, "Failed to process message"))?;

    Ok(Json(SendMessageResponse {
        success: true,
        messages: exchange.conversation.messages,
        last_message: LastMessage {
            role: exchange.last_message.role,
            content: exchange.last_message.content,
        },
    }))
}

/// DELETE /api/messages - Discard the history and start a fresh conversation.
pub async fn clear_messages(
    State(state): State<AppState>,
) -> Result<Json<ClearResponse>, AppError> {
    state
        .conversations
        .reset()
        .await
        .map_err(|e| AppError::internal("Failed to clear messages", e))?;

    Ok(Json(ClearResponse {
        success: true,
        message: "Chat history cleared",
    }))
}
