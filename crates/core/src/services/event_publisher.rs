//! Event publisher service.
//!
//! Provides an abstraction for publishing real-time events. The actual
//! implementation lives in the streaming layer; services only see this trait.

use async_trait::async_trait;
use lendlocal_common::AppResult;
use std::sync::Arc;

/// Event types for real-time updates.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// A new notification was created for a user.
    Notification {
        id: String,
        recipient_id: String,
        sender_id: String,
        notification_type: String,
        message: String,
        link: String,
    },
    /// A new chat message was posted to a conversation.
    ChatMessage {
        id: String,
        conversation_id: String,
        sender_id: String,
        content: Option<String>,
        image_url: Option<String>,
    },
}

/// Trait for publishing real-time events.
///
/// Delivery is fire-and-forget; the persisted row is the durable fallback for
/// recipients who are offline when the event fires.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a notification event addressed to its recipient.
    async fn publish_notification(
        &self,
        id: &str,
        recipient_id: &str,
        sender_id: &str,
        notification_type: &str,
        message: &str,
        link: &str,
    ) -> AppResult<()>;

    /// Publish a chat message event addressed to its conversation.
    async fn publish_chat_message(
        &self,
        id: &str,
        conversation_id: &str,
        sender_id: &str,
        content: Option<&str>,
        image_url: Option<&str>,
    ) -> AppResult<()>;
}

/// A no-op implementation for testing or when real-time events are disabled.
#[derive(Clone, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish_notification(
        &self,
        _id: &str,
        _recipient_id: &str,
        _sender_id: &str,
        _notification_type: &str,
        _message: &str,
        _link: &str,
    ) -> AppResult<()> {
        Ok(())
    }

    async fn publish_chat_message(
        &self,
        _id: &str,
        _conversation_id: &str,
        _sender_id: &str,
        _content: Option<&str>,
        _image_url: Option<&str>,
    ) -> AppResult<()> {
        Ok(())
    }
}

/// Wrapper for boxed `EventPublisher` trait object.
pub type EventPublisherService = Arc<dyn EventPublisher>;
