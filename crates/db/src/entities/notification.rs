//! Notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum NotificationType {
    #[sea_orm(string_value = "new_borrow_request")]
    NewBorrowRequest,
    #[sea_orm(string_value = "request_approved")]
    RequestApproved,
    #[sea_orm(string_value = "request_denied")]
    RequestDenied,
    #[sea_orm(string_value = "item_returned")]
    ItemReturned,
    #[sea_orm(string_value = "new_offer")]
    NewOffer,
    #[sea_orm(string_value = "offer_accepted")]
    OfferAccepted,
    #[sea_orm(string_value = "new_follower")]
    NewFollower,
    #[sea_orm(string_value = "new_message")]
    NewMessage,
    #[sea_orm(string_value = "return_confirmed")]
    ReturnConfirmed,
    #[sea_orm(string_value = "new_join_request")]
    NewJoinRequest,
    #[sea_orm(string_value = "new_item_request")]
    NewItemRequest,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user receiving the notification
    #[sea_orm(indexed)]
    pub recipient_id: String,

    /// The user who triggered the notification
    pub sender_id: String,

    pub notification_type: NotificationType,

    /// Rendered human-readable body
    #[sea_orm(column_type = "Text")]
    pub message: String,

    /// In-app path the notification points at
    pub link: String,

    /// Item name for borrow-related notifications
    #[sea_orm(nullable)]
    pub item_name: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_read: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecipientId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SenderId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Sender,
}

impl ActiveModelBehavior for ActiveModel {}
