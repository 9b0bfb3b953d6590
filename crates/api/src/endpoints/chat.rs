//! Chat endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use lendlocal_common::AppResult;
use lendlocal_core::ConversationView;
use lendlocal_db::entities::{conversation, message};
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Start (or resume) a conversation with another user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartConversationRequest {
    pub user_id: String,
}

async fn start_conversation(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<StartConversationRequest>,
) -> AppResult<ApiResponse<conversation::Model>> {
    let conversation = state
        .chat_service
        .find_or_create_conversation(&user.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(conversation))
}

async fn list_conversations(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ConversationView>>> {
    let conversations = state.chat_service.list_conversations(&user.id).await?;
    Ok(ApiResponse::ok(conversations))
}

async fn get_messages(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> AppResult<ApiResponse<Vec<message::Model>>> {
    let messages = state
        .chat_service
        .get_messages(&conversation_id, &user.id)
        .await?;
    Ok(ApiResponse::ok(messages))
}

/// Send message request. At least one of `content` / `imageUrl` is required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub content: Option<String>,
    pub image_url: Option<String>,
}

async fn send_message(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<ApiResponse<message::Model>> {
    let message = state
        .chat_service
        .send_message(&user.id, &conversation_id, req.content, req.image_url)
        .await?;
    Ok(ApiResponse::ok(message))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/conversations",
            post(start_conversation).get(list_conversations),
        )
        .route(
            "/conversations/{id}/messages",
            get(get_messages).post(send_message),
        )
}
