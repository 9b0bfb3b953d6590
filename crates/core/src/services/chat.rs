//! Chat relay service.
//!
//! Conversations are 1:1, stored with participants in sorted order so the
//! unordered pair is unique. Sending a message publishes it over the real-time
//! channel and, when the other participant is neither viewing the conversation
//! nor already holding an unread message notification for it, creates exactly
//! one `new_message` notification (burst suppression).

use crate::services::event_publisher::EventPublisherService;
use crate::services::notification::{NotificationEvent, NotificationService};
use crate::services::presence::PresenceRegistry;
use crate::services::user::UserSummary;
use lendlocal_common::{AppError, AppResult, IdGenerator};
use lendlocal_db::{
    entities::{
        conversation::{self, sorted_pair},
        message,
        notification::NotificationType,
    },
    repositories::{ChatRepository, NotificationRepository, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;

/// A conversation with participant summaries and its latest message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    #[serde(flatten)]
    pub conversation: conversation::Model,
    pub other_participant: Option<UserSummary>,
    pub last_message: Option<message::Model>,
}

/// Chat service for business logic.
#[derive(Clone)]
pub struct ChatService {
    chat_repo: ChatRepository,
    user_repo: UserRepository,
    notification_repo: NotificationRepository,
    notification_service: NotificationService,
    presence: PresenceRegistry,
    event_publisher: Option<EventPublisherService>,
    id_gen: IdGenerator,
}

impl ChatService {
    /// Create a new chat service.
    #[must_use]
    pub fn new(
        chat_repo: ChatRepository,
        user_repo: UserRepository,
        notification_repo: NotificationRepository,
        notification_service: NotificationService,
        presence: PresenceRegistry,
    ) -> Self {
        Self {
            chat_repo,
            user_repo,
            notification_repo,
            notification_service,
            presence,
            event_publisher: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the event publisher.
    pub fn set_event_publisher(&mut self, event_publisher: EventPublisherService) {
        self.event_publisher = Some(event_publisher);
    }

    /// Find the conversation between two users, creating it on first contact.
    pub async fn find_or_create_conversation(
        &self,
        user_id: &str,
        other_user_id: &str,
    ) -> AppResult<conversation::Model> {
        if user_id == other_user_id {
            return Err(AppError::BadRequest(
                "You cannot start a conversation with yourself".to_string(),
            ));
        }

        self.user_repo
            .find_by_id(other_user_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(other_user_id.to_string()))?;

        let (a, b) = sorted_pair(user_id, other_user_id);
        if let Some(existing) = self.chat_repo.find_conversation_by_pair(a, b).await? {
            return Ok(existing);
        }

        self.chat_repo
            .create_conversation(conversation::ActiveModel {
                id: Set(self.id_gen.generate()),
                participant_a_id: Set(a.to_string()),
                participant_b_id: Set(b.to_string()),
                last_message_id: Set(None),
                created_at: Set(chrono::Utc::now().into()),
                updated_at: Set(None),
            })
            .await
    }

    /// A user's conversations, most recently updated first.
    pub async fn list_conversations(&self, user_id: &str) -> AppResult<Vec<ConversationView>> {
        let conversations = self.chat_repo.find_conversations_for_user(user_id).await?;

        let other_ids: Vec<String> = conversations
            .iter()
            .map(|c| c.other_participant(user_id).to_string())
            .collect();
        let others = self.user_repo.find_by_ids(&other_ids).await?;

        let mut views = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let other_participant = others
                .iter()
                .find(|u| u.id == conversation.other_participant(user_id))
                .map(UserSummary::from);
            let last_message = match &conversation.last_message_id {
                Some(id) => self.chat_repo.find_message_by_id(id).await?,
                None => None,
            };
            views.push(ConversationView {
                conversation,
                other_participant,
                last_message,
            });
        }
        Ok(views)
    }

    /// Messages in a conversation, oldest first. Participants only.
    pub async fn get_messages(
        &self,
        conversation_id: &str,
        user_id: &str,
    ) -> AppResult<Vec<message::Model>> {
        self.participant_conversation(conversation_id, user_id)
            .await?;
        self.chat_repo.find_messages(conversation_id).await
    }

    /// Send a message into a conversation.
    pub async fn send_message(
        &self,
        sender_id: &str,
        conversation_id: &str,
        content: Option<String>,
        image_url: Option<String>,
    ) -> AppResult<message::Model> {
        if content.as_deref().map_or(true, str::is_empty) && image_url.is_none() {
            return Err(AppError::BadRequest(
                "A message needs text or an image".to_string(),
            ));
        }

        let conversation = self
            .participant_conversation(conversation_id, sender_id)
            .await?;
        let recipient_id = conversation.other_participant(sender_id).to_string();

        let message = self
            .chat_repo
            .create_message(message::ActiveModel {
                id: Set(self.id_gen.generate()),
                conversation_id: Set(conversation_id.to_string()),
                sender_id: Set(sender_id.to_string()),
                content: Set(content),
                image_url: Set(image_url),
                created_at: Set(chrono::Utc::now().into()),
            })
            .await?;

        self.chat_repo
            .set_last_message(conversation, &message.id)
            .await?;

        // Replying implies the sender has seen the conversation; retire their
        // own unread message notifications for it.
        let link = conversation_link(conversation_id);
        self.notification_repo
            .mark_read_by_link(sender_id, NotificationType::NewMessage, &link)
            .await?;

        if let Some(ref event_publisher) = self.event_publisher {
            if let Err(e) = event_publisher
                .publish_chat_message(
                    &message.id,
                    conversation_id,
                    sender_id,
                    message.content.as_deref(),
                    message.image_url.as_deref(),
                )
                .await
            {
                tracing::warn!(error = %e, "Failed to publish chat message event");
            }
        }

        let viewing = self
            .presence
            .is_viewing(&recipient_id, conversation_id)
            .await;
        let already_notified = self
            .notification_repo
            .unread_exists(&recipient_id, NotificationType::NewMessage, &link)
            .await?;

        if !viewing && !already_notified {
            self.notification_service
                .notify(
                    &recipient_id,
                    sender_id,
                    NotificationEvent::NewMessage,
                    "sent you a message",
                    &link,
                )
                .await?;
        }

        Ok(message)
    }

    /// Whether the user is a participant of the conversation. Used by the
    /// streaming layer to vet presence signals and filter message events.
    pub async fn is_participant(&self, conversation_id: &str, user_id: &str) -> AppResult<bool> {
        Ok(self
            .chat_repo
            .find_conversation_by_id(conversation_id)
            .await?
            .is_some_and(|c| c.has_participant(user_id)))
    }

    async fn participant_conversation(
        &self,
        conversation_id: &str,
        user_id: &str,
    ) -> AppResult<conversation::Model> {
        let conversation = self
            .chat_repo
            .find_conversation_by_id(conversation_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("conversation {conversation_id}")))?;

        if !conversation.has_participant(user_id) {
            return Err(AppError::Forbidden(
                "You are not a participant in this conversation".to_string(),
            ));
        }

        Ok(conversation)
    }
}

/// The notification link shared by all message notifications for one
/// conversation, which is what burst suppression keys on.
#[must_use]
pub fn conversation_link(conversation_id: &str) -> String {
    format!("/chat/{conversation_id}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use lendlocal_db::entities::{notification, user};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn service(db: DatabaseConnection, presence: PresenceRegistry) -> ChatService {
        let db = Arc::new(db);
        let user_repo = UserRepository::new(Arc::clone(&db));
        let notification_repo = NotificationRepository::new(Arc::clone(&db));
        let notification_service = NotificationService::new(
            notification_repo.clone(),
            user_repo.clone(),
            String::new(),
        );
        ChatService::new(
            ChatRepository::new(db),
            user_repo,
            notification_repo,
            notification_service,
            presence,
        )
    }

    fn sample_conversation() -> conversation::Model {
        conversation::Model {
            id: "c1".to_string(),
            participant_a_id: "a1".to_string(),
            participant_b_id: "b1".to_string(),
            last_message_id: None,
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        }
    }

    fn sample_message() -> message::Model {
        message::Model {
            id: "m1".to_string(),
            conversation_id: "c1".to_string(),
            sender_id: "a1".to_string(),
            content: Some("hi".to_string()),
            image_url: None,
            created_at: chrono::Utc::now().into(),
        }
    }

    fn sample_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: id.to_string(),
            email: format!("{id}@example.com"),
            avatar_url: None,
            token: format!("token-{id}"),
            reputation_score: 5.0,
            is_disabled: false,
            notification_preferences: serde_json::json!({}),
            email_notification_preferences: serde_json::json!({}),
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        }
    }

    fn sample_notification() -> notification::Model {
        notification::Model {
            id: "n1".to_string(),
            recipient_id: "b1".to_string(),
            sender_id: "a1".to_string(),
            notification_type: NotificationType::NewMessage,
            message: "sent you a message".to_string(),
            link: "/chat/c1".to_string(),
            item_name: None,
            is_read: false,
            created_at: chrono::Utc::now().into(),
        }
    }

    fn unread_count(n: i64) -> BTreeMap<&'static str, Value> {
        let mut row = BTreeMap::new();
        row.insert("num_items", Value::BigInt(Some(n)));
        row
    }

    fn send_mock(unread: i64) -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_conversation()]])
            .append_query_results([vec![sample_message()]])
            .append_query_results([vec![sample_conversation()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([vec![unread_count(unread)]])
    }

    #[test]
    fn test_conversation_link_is_stable() {
        assert_eq!(conversation_link("c1"), "/chat/c1");
        assert_eq!(conversation_link("c1"), conversation_link("c1"));
    }

    #[tokio::test]
    async fn test_no_notification_while_recipient_views_conversation() {
        // No notification rows are prepared: an attempted insert would fail
        // the mock, so Ok proves the notification was suppressed.
        let presence = PresenceRegistry::new();
        presence.connect("b1").await;
        presence.view_conversation("b1", "c1").await;
        let svc = service(send_mock(0).into_connection(), presence);

        let message = svc
            .send_message("a1", "c1", Some("hi".to_string()), None)
            .await
            .unwrap();
        assert_eq!(message.id, "m1");
    }

    #[tokio::test]
    async fn test_no_second_notification_while_one_is_unread() {
        let svc = service(send_mock(1).into_connection(), PresenceRegistry::new());

        let message = svc
            .send_message("a1", "c1", Some("hi".to_string()), None)
            .await
            .unwrap();
        assert_eq!(message.id, "m1");
    }

    #[tokio::test]
    async fn test_notification_sent_once_recipient_stops_viewing() {
        let db = send_mock(0)
            .append_query_results([vec![sample_user("b1")], vec![sample_user("a1")]])
            .append_query_results([vec![sample_notification()]])
            .into_connection();
        let presence = PresenceRegistry::new();
        presence.connect("b1").await;
        let svc = service(db, presence);

        let message = svc
            .send_message("a1", "c1", Some("hi".to_string()), None)
            .await
            .unwrap();
        assert_eq!(message.id, "m1");
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            PresenceRegistry::new(),
        );

        let result = svc.send_message("a1", "c1", None, None).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_non_participant_cannot_send() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_conversation()]])
            .into_connection();
        let svc = service(db, PresenceRegistry::new());

        let result = svc
            .send_message("z9", "c1", Some("hi".to_string()), None)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
