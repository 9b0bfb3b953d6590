//! Chat repository: conversations and messages.

use std::sync::Arc;

use crate::entities::{Conversation, Message, conversation, message};
use lendlocal_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

/// Chat repository for database operations.
#[derive(Clone)]
pub struct ChatRepository {
    db: Arc<DatabaseConnection>,
}

impl ChatRepository {
    /// Create a new chat repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a conversation by ID.
    pub async fn find_conversation_by_id(
        &self,
        id: &str,
    ) -> AppResult<Option<conversation::Model>> {
        Conversation::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the conversation for a participant pair already in storage order.
    pub async fn find_conversation_by_pair(
        &self,
        participant_a_id: &str,
        participant_b_id: &str,
    ) -> AppResult<Option<conversation::Model>> {
        Conversation::find()
            .filter(conversation::Column::ParticipantAId.eq(participant_a_id))
            .filter(conversation::Column::ParticipantBId.eq(participant_b_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A user's conversations, most recently updated first.
    pub async fn find_conversations_for_user(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<conversation::Model>> {
        Conversation::find()
            .filter(
                Condition::any()
                    .add(conversation::Column::ParticipantAId.eq(user_id))
                    .add(conversation::Column::ParticipantBId.eq(user_id)),
            )
            .order_by_desc(conversation::Column::UpdatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new conversation.
    pub async fn create_conversation(
        &self,
        model: conversation::ActiveModel,
    ) -> AppResult<conversation::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record the latest message on a conversation.
    pub async fn set_last_message(
        &self,
        conversation: conversation::Model,
        message_id: &str,
    ) -> AppResult<conversation::Model> {
        let mut active: conversation::ActiveModel = conversation.into();
        active.last_message_id = Set(Some(message_id.to_string()));
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new message.
    pub async fn create_message(&self, model: message::ActiveModel) -> AppResult<message::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a message by ID.
    pub async fn find_message_by_id(&self, id: &str) -> AppResult<Option<message::Model>> {
        Message::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Messages in a conversation, oldest first.
    pub async fn find_messages(&self, conversation_id: &str) -> AppResult<Vec<message::Model>> {
        Message::find()
            .filter(message::Column::ConversationId.eq(conversation_id))
            .order_by_asc(message::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
