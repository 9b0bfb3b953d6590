//! Conversation entity for 1:1 chat.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "conversation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Lexicographically smaller participant ID
    #[sea_orm(indexed)]
    pub participant_a_id: String,

    /// Lexicographically larger participant ID
    #[sea_orm(indexed)]
    pub participant_b_id: String,

    #[sea_orm(nullable)]
    pub last_message_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Whether the given user is one of the two participants.
    #[must_use]
    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participant_a_id == user_id || self.participant_b_id == user_id
    }

    /// The participant other than the given user.
    #[must_use]
    pub fn other_participant(&self, user_id: &str) -> &str {
        if self.participant_a_id == user_id {
            &self.participant_b_id
        } else {
            &self.participant_a_id
        }
    }
}

/// Normalize an unordered participant pair into storage order.
#[must_use]
pub fn sorted_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ParticipantAId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    ParticipantA,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ParticipantBId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    ParticipantB,

    #[sea_orm(has_many = "super::message::Entity")]
    Messages,
}

impl Related<super::message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_pair_is_order_independent() {
        assert_eq!(sorted_pair("alice", "bob"), ("alice", "bob"));
        assert_eq!(sorted_pair("bob", "alice"), ("alice", "bob"));
    }

    #[test]
    fn test_other_participant() {
        let conversation = Model {
            id: "c1".into(),
            participant_a_id: "alice".into(),
            participant_b_id: "bob".into(),
            last_message_id: None,
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        };
        assert_eq!(conversation.other_participant("alice"), "bob");
        assert_eq!(conversation.other_participant("bob"), "alice");
        assert!(conversation.has_participant("alice"));
        assert!(!conversation.has_participant("carol"));
    }
}
