//! Notification fan-out service.
//!
//! Every notification follows the same path: persist the row, push it over the
//! real-time channel, then send an email if the recipient's per-type email
//! preference allows it. The on-site notification is always created; only the
//! email leg is preference-gated.

use crate::services::email::EmailService;
use crate::services::event_publisher::EventPublisherService;
use crate::services::user::UserSummary;
use chrono::{DateTime, Utc};
use lendlocal_common::{AppError, AppResult, IdGenerator};
use lendlocal_db::{
    entities::{
        notification::{self, NotificationType},
        user::NotificationPreferences,
    },
    repositories::{NotificationRepository, UserRepository},
};
use sea_orm::{ActiveEnum, Set};
use serde::Serialize;

/// A notification-worthy domain event, carrying exactly the data its email
/// subject template needs.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    NewBorrowRequest { item_name: String },
    RequestApproved { item_name: String },
    RequestDenied { item_name: String },
    ItemReturned { item_name: String },
    NewOffer { request_title: String },
    OfferAccepted { request_title: String },
    NewFollower,
    NewMessage,
    ReturnConfirmed { item_name: String },
    NewJoinRequest { community_name: String },
    NewItemRequest { request_title: String },
}

impl NotificationEvent {
    /// The persisted notification type for this event.
    #[must_use]
    pub const fn notification_type(&self) -> NotificationType {
        match self {
            Self::NewBorrowRequest { .. } => NotificationType::NewBorrowRequest,
            Self::RequestApproved { .. } => NotificationType::RequestApproved,
            Self::RequestDenied { .. } => NotificationType::RequestDenied,
            Self::ItemReturned { .. } => NotificationType::ItemReturned,
            Self::NewOffer { .. } => NotificationType::NewOffer,
            Self::OfferAccepted { .. } => NotificationType::OfferAccepted,
            Self::NewFollower => NotificationType::NewFollower,
            Self::NewMessage => NotificationType::NewMessage,
            Self::ReturnConfirmed { .. } => NotificationType::ReturnConfirmed,
            Self::NewJoinRequest { .. } => NotificationType::NewJoinRequest,
            Self::NewItemRequest { .. } => NotificationType::NewItemRequest,
        }
    }

    /// Item name recorded on the notification row, where applicable.
    #[must_use]
    pub fn item_name(&self) -> Option<&str> {
        match self {
            Self::NewBorrowRequest { item_name }
            | Self::RequestApproved { item_name }
            | Self::RequestDenied { item_name }
            | Self::ItemReturned { item_name }
            | Self::ReturnConfirmed { item_name } => Some(item_name),
            _ => None,
        }
    }

    /// Render the email subject line for this event.
    ///
    /// Subjects name the sender and, where one exists, the item or post the
    /// event concerns, suffixed with a human-readable timestamp.
    #[must_use]
    pub fn email_subject(&self, sender_name: &str, at: DateTime<Utc>) -> String {
        let body = match self {
            Self::NewBorrowRequest { item_name } => {
                format!("{sender_name} wants to borrow your {item_name}")
            }
            Self::RequestApproved { item_name } => {
                format!("{sender_name} approved your request for {item_name}")
            }
            Self::RequestDenied { item_name } => {
                format!("{sender_name} declined your request for {item_name}")
            }
            Self::ItemReturned { item_name } => {
                format!("{sender_name} marked {item_name} as returned")
            }
            Self::NewOffer { request_title } => {
                format!("{sender_name} offered an item for \"{request_title}\"")
            }
            Self::OfferAccepted { request_title } => {
                format!("{sender_name} accepted your offer on \"{request_title}\"")
            }
            Self::NewFollower => format!("{sender_name} started following you"),
            Self::NewMessage => format!("New message from {sender_name}"),
            Self::ReturnConfirmed { item_name } => {
                format!("{sender_name} confirmed the return of {item_name}")
            }
            Self::NewJoinRequest { community_name } => {
                format!("{sender_name} requested to join {community_name}")
            }
            Self::NewItemRequest { request_title } => {
                format!("{sender_name} is looking for \"{request_title}\"")
            }
        };

        format!("{body} - {}", at.format("%b %-d, %Y at %-I:%M %p"))
    }
}

/// A notification paired with its sender summary for API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: notification::Model,
    pub sender: Option<UserSummary>,
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    user_repo: UserRepository,
    event_publisher: Option<EventPublisherService>,
    email_service: Option<EmailService>,
    link_base: String,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub fn new(
        notification_repo: NotificationRepository,
        user_repo: UserRepository,
        link_base: String,
    ) -> Self {
        Self {
            notification_repo,
            user_repo,
            event_publisher: None,
            email_service: None,
            link_base,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the event publisher.
    pub fn set_event_publisher(&mut self, event_publisher: EventPublisherService) {
        self.event_publisher = Some(event_publisher);
    }

    /// Set the email service.
    pub fn set_email_service(&mut self, email_service: EmailService) {
        self.email_service = Some(email_service);
    }

    /// Create a notification and fan it out.
    ///
    /// The row is always persisted. The real-time push and the email are both
    /// best-effort: failures are logged and never surfaced to the caller that
    /// triggered the event. The email leg additionally requires that the
    /// recipient's per-type email preference is not disabled; an absent key
    /// means send.
    pub async fn notify(
        &self,
        recipient_id: &str,
        sender_id: &str,
        event: NotificationEvent,
        message: &str,
        link: &str,
    ) -> AppResult<notification::Model> {
        let recipient = self
            .user_repo
            .find_by_id(recipient_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(recipient_id.to_string()))?;
        let sender = self
            .user_repo
            .find_by_id(sender_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(sender_id.to_string()))?;

        let notification_type = event.notification_type();
        let now = chrono::Utc::now();

        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(recipient_id.to_string()),
            sender_id: Set(sender_id.to_string()),
            notification_type: Set(notification_type),
            message: Set(message.to_string()),
            link: Set(link.to_string()),
            item_name: Set(event.item_name().map(ToString::to_string)),
            is_read: Set(false),
            created_at: Set(now.into()),
        };

        let notification = self.notification_repo.create(model).await?;

        if let Some(ref event_publisher) = self.event_publisher {
            if let Err(e) = event_publisher
                .publish_notification(
                    &notification.id,
                    recipient_id,
                    sender_id,
                    &notification_type.to_value(),
                    message,
                    link,
                )
                .await
            {
                tracing::warn!(error = %e, "Failed to publish notification event");
            }
        }

        if let Some(ref email_service) = self.email_service {
            let email_prefs =
                NotificationPreferences::from_json(&recipient.email_notification_preferences);
            if email_prefs.allows(&notification_type) {
                let subject = event.email_subject(&sender.name, now);
                let full_link = format!("{}{}", self.link_base, link);
                if let Err(e) = email_service
                    .send_notification(&recipient.email, &subject, message, &full_link)
                    .await
                {
                    tracing::warn!(error = %e, recipient = %recipient.id, "Failed to send notification email");
                }
            }
        }

        Ok(notification)
    }

    /// Notifications for a user, newest first, with sender summaries.
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<NotificationView>> {
        let notifications = self.notification_repo.find_by_recipient(user_id).await?;

        let sender_ids: Vec<String> = notifications.iter().map(|n| n.sender_id.clone()).collect();
        let senders = self.user_repo.find_by_ids(&sender_ids).await?;

        Ok(notifications
            .into_iter()
            .map(|n| {
                let sender = senders
                    .iter()
                    .find(|u| u.id == n.sender_id)
                    .map(UserSummary::from);
                NotificationView {
                    notification: n,
                    sender,
                }
            })
            .collect())
    }

    /// Mark a notification as read.
    ///
    /// Repeat marks by the owner are a no-op success; anyone else gets
    /// `NotFound`, as if the notification did not exist.
    pub async fn mark_as_read(&self, notification_id: &str, user_id: &str) -> AppResult<()> {
        let notification = self
            .notification_repo
            .find_by_id(notification_id)
            .await?
            .filter(|n| n.recipient_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("notification {notification_id}")))?;

        if notification.is_read {
            return Ok(());
        }

        self.notification_repo.mark_as_read(notification).await
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 15, 4, 0).unwrap()
    }

    fn service(db: DatabaseConnection) -> NotificationService {
        let db = Arc::new(db);
        NotificationService::new(
            NotificationRepository::new(Arc::clone(&db)),
            lendlocal_db::repositories::UserRepository::new(db),
            String::new(),
        )
    }

    fn stored_notification(recipient: &str, is_read: bool) -> notification::Model {
        notification::Model {
            id: "n1".to_string(),
            recipient_id: recipient.to_string(),
            sender_id: "u2".to_string(),
            notification_type: NotificationType::NewMessage,
            message: "sent you a message".to_string(),
            link: "/chat/c1".to_string(),
            item_name: None,
            is_read,
            created_at: chrono::Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_repeat_mark_as_read_is_a_noop() {
        // A single prepared result: an already-read row must not be updated.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored_notification("u1", true)]])
            .into_connection();
        let svc = service(db);

        assert!(svc.mark_as_read("n1", "u1").await.is_ok());
    }

    #[tokio::test]
    async fn test_mark_as_read_hides_others_notifications() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored_notification("u1", false)]])
            .into_connection();
        let svc = service(db);

        let result = svc.mark_as_read("n1", "u9").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_subject_names_sender_and_item() {
        let event = NotificationEvent::NewBorrowRequest {
            item_name: "ladder".into(),
        };
        let subject = event.email_subject("Alice", at());
        assert!(subject.starts_with("Alice wants to borrow your ladder"));
        assert!(subject.ends_with("Jun 1, 2025 at 3:04 PM"));
    }

    #[test]
    fn test_subject_for_every_event_mentions_sender() {
        let events = [
            NotificationEvent::NewBorrowRequest { item_name: "x".into() },
            NotificationEvent::RequestApproved { item_name: "x".into() },
            NotificationEvent::RequestDenied { item_name: "x".into() },
            NotificationEvent::ItemReturned { item_name: "x".into() },
            NotificationEvent::NewOffer { request_title: "x".into() },
            NotificationEvent::OfferAccepted { request_title: "x".into() },
            NotificationEvent::NewFollower,
            NotificationEvent::NewMessage,
            NotificationEvent::ReturnConfirmed { item_name: "x".into() },
            NotificationEvent::NewJoinRequest { community_name: "x".into() },
            NotificationEvent::NewItemRequest { request_title: "x".into() },
        ];
        for event in events {
            let subject = event.email_subject("Alice", at());
            assert!(subject.contains("Alice"), "subject missing sender: {subject}");
        }
    }

    #[test]
    fn test_item_name_only_on_item_events() {
        assert_eq!(
            NotificationEvent::ItemReturned { item_name: "drill".into() }.item_name(),
            Some("drill")
        );
        assert_eq!(NotificationEvent::NewMessage.item_name(), None);
        assert_eq!(
            NotificationEvent::NewOffer { request_title: "t".into() }.item_name(),
            None
        );
    }
}
