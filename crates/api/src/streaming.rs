//! WebSocket streaming API.
//!
//! A single in-process broadcast channel carries every real-time event; each
//! connection filters to what its user may see (their own notifications, chat
//! messages in conversations they participate in). Delivery is at-most-once
//! and fire-and-forget: the persisted notification row is the durable
//! fallback for users who are offline when an event fires.

#![allow(missing_docs)]

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use lendlocal_common::AppResult;
use lendlocal_core::{EventPublisher, StreamEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::middleware::AppState;

/// Streaming query parameters.
#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    /// Access token for authentication.
    #[serde(rename = "i")]
    pub token: Option<String>,
}

/// Client-to-server message.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "body", rename_all = "camelCase")]
pub enum ClientMessage {
    /// The user opened a conversation on screen.
    #[serde(rename_all = "camelCase")]
    ViewConversation { conversation_id: String },
    /// The user navigated away from the conversation.
    StopViewing,
    /// Application-level keepalive.
    Ping,
}

/// Server-to-client message.
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "body", rename_all = "camelCase")]
pub enum ServerMessage {
    /// A notification addressed to this user.
    #[serde(rename_all = "camelCase")]
    Notification {
        id: String,
        sender_id: String,
        notification_type: String,
        message: String,
        link: String,
    },
    /// A chat message in one of this user's conversations.
    #[serde(rename_all = "camelCase")]
    Message {
        id: String,
        conversation_id: String,
        sender_id: String,
        content: Option<String>,
        image_url: Option<String>,
    },
    /// Keepalive reply.
    Pong,
}

/// Shared state for streaming.
#[derive(Clone)]
pub struct StreamingState {
    /// Broadcast sender all connections subscribe to.
    tx: Arc<broadcast::Sender<StreamEvent>>,
}

impl StreamingState {
    /// Create a new streaming state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1000);
        Self { tx: Arc::new(tx) }
    }

    fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.tx.subscribe()
    }
}

impl Default for StreamingState {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for StreamingState {
    async fn publish_notification(
        &self,
        id: &str,
        recipient_id: &str,
        sender_id: &str,
        notification_type: &str,
        message: &str,
        link: &str,
    ) -> AppResult<()> {
        // A send error just means nobody is connected.
        let _ = self.tx.send(StreamEvent::Notification {
            id: id.to_string(),
            recipient_id: recipient_id.to_string(),
            sender_id: sender_id.to_string(),
            notification_type: notification_type.to_string(),
            message: message.to_string(),
            link: link.to_string(),
        });
        Ok(())
    }

    async fn publish_chat_message(
        &self,
        id: &str,
        conversation_id: &str,
        sender_id: &str,
        content: Option<&str>,
        image_url: Option<&str>,
    ) -> AppResult<()> {
        let _ = self.tx.send(StreamEvent::ChatMessage {
            id: id.to_string(),
            conversation_id: conversation_id.to_string(),
            sender_id: sender_id.to_string(),
            content: content.map(ToString::to_string),
            image_url: image_url.map(ToString::to_string),
        });
        Ok(())
    }
}

/// WebSocket handler for streaming.
pub async fn streaming_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<StreamQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, query, state))
}

/// Handle a WebSocket connection.
async fn handle_socket(socket: WebSocket, query: StreamQuery, state: AppState) {
    let user = match &query.token {
        Some(token) => match state.user_service.authenticate_by_token(token).await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Streaming auth failed");
                None
            }
        },
        None => None,
    };

    // Every event on the stream is addressed, so anonymous connections have
    // nothing to receive.
    let Some(user) = user else {
        let mut socket = socket;
        let _ = socket.send(Message::Close(None)).await;
        return;
    };
    let user_id = user.id;

    info!(user_id = %user_id, "Streaming connection established");

    state.presence.connect(&user_id).await;

    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.streaming.subscribe();

    loop {
        tokio::select! {
            Some(msg) = receiver.next() => {
                match msg {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                if let Some(response) =
                                    handle_client_message(client_msg, &state, &user_id).await
                                {
                                    let json = serde_json::to_string(&response).unwrap_or_default();
                                    if sender.send(Message::Text(json.into())).await.is_err() {
                                        break;
                                    }
                                }
                            }
                            Err(e) => {
                                warn!(error = %e, "Failed to parse client message");
                            }
                        }
                    }
                    Ok(Message::Close(_)) => {
                        break;
                    }
                    Ok(Message::Ping(data)) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!(error = %e, "WebSocket error");
                        break;
                    }
                }
            }

            Ok(event) = rx.recv() => {
                if let Some(msg) = filter_event(&event, &state, &user_id).await {
                    let json = serde_json::to_string(&msg).unwrap_or_default();
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    state.presence.disconnect(&user_id).await;
    info!(user_id = %user_id, "Streaming connection closed");
}

/// Handle a client message.
async fn handle_client_message(
    msg: ClientMessage,
    state: &AppState,
    user_id: &str,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::ViewConversation { conversation_id } => {
            // Only participants may register presence on a conversation.
            match state
                .chat_service
                .is_participant(&conversation_id, user_id)
                .await
            {
                Ok(true) => {
                    state
                        .presence
                        .view_conversation(user_id, &conversation_id)
                        .await;
                }
                Ok(false) => {
                    warn!(user_id = %user_id, conversation_id = %conversation_id,
                        "Presence signal for a conversation the user is not in");
                }
                Err(e) => {
                    warn!(error = %e, "Failed to verify conversation participant");
                }
            }
            None
        }
        ClientMessage::StopViewing => {
            state.presence.stop_viewing(user_id).await;
            None
        }
        ClientMessage::Ping => Some(ServerMessage::Pong),
    }
}

/// Decide whether an event is visible to this connection's user.
async fn filter_event(event: &StreamEvent, state: &AppState, user_id: &str) -> Option<ServerMessage> {
    match event {
        StreamEvent::Notification {
            id,
            recipient_id,
            sender_id,
            notification_type,
            message,
            link,
        } => {
            if recipient_id != user_id {
                return None;
            }
            Some(ServerMessage::Notification {
                id: id.clone(),
                sender_id: sender_id.clone(),
                notification_type: notification_type.clone(),
                message: message.clone(),
                link: link.clone(),
            })
        }
        StreamEvent::ChatMessage {
            id,
            conversation_id,
            sender_id,
            content,
            image_url,
        } => {
            // The sender already has the message; deliver to the other
            // participant only.
            if sender_id == user_id {
                return None;
            }
            match state.chat_service.is_participant(conversation_id, user_id).await {
                Ok(true) => Some(ServerMessage::Message {
                    id: id.clone(),
                    conversation_id: conversation_id.clone(),
                    sender_id: sender_id.clone(),
                    content: content.clone(),
                    image_url: image_url.clone(),
                }),
                Ok(false) => None,
                Err(e) => {
                    warn!(error = %e, "Failed to filter chat message event");
                    None
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view_conversation() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"viewConversation","body":{"conversationId":"c1"}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::ViewConversation {
                conversation_id: "c1".to_string()
            }
        );
    }

    #[test]
    fn test_parse_stop_viewing_and_ping() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"stopViewing"}"#).unwrap();
        assert_eq!(msg, ClientMessage::StopViewing);

        let msg: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Ping);
    }

    #[test]
    fn test_notification_message_shape() {
        let msg = ServerMessage::Notification {
            id: "n1".to_string(),
            sender_id: "u2".to_string(),
            notification_type: "new_message".to_string(),
            message: "sent you a message".to_string(),
            link: "/chat/c1".to_string(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "notification");
        assert_eq!(json["body"]["senderId"], "u2");
        assert_eq!(json["body"]["notificationType"], "new_message");
    }
}
