//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Display name
    pub name: String,

    /// Email address (unique, used for notification delivery)
    #[sea_orm(unique)]
    pub email: String,

    /// Avatar image URL
    #[sea_orm(nullable)]
    pub avatar_url: Option<String>,

    /// Opaque API token used by the auth middleware
    #[sea_orm(unique)]
    pub token: String,

    /// Mean of received review ratings, 5.0 when unrated
    #[sea_orm(default_value = 5.0)]
    pub reputation_score: f64,

    /// Disabled accounts cannot authenticate
    #[sea_orm(default_value = false)]
    pub is_disabled: bool,

    /// Per-type on-site notification preferences
    #[sea_orm(column_type = "JsonBinary")]
    pub notification_preferences: Json,

    /// Per-type email notification preferences
    #[sea_orm(column_type = "JsonBinary")]
    pub email_notification_preferences: Json,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::item::Entity")]
    Items,

    #[sea_orm(has_many = "super::community_member::Entity")]
    Memberships,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Per-notification-type delivery preferences.
///
/// Every key is present with a default of `true`, so JSON stored before a new
/// notification type existed deserializes to "allow" for that type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    #[serde(default = "default_true")]
    pub new_borrow_request: bool,
    #[serde(default = "default_true")]
    pub request_approved: bool,
    #[serde(default = "default_true")]
    pub request_denied: bool,
    #[serde(default = "default_true")]
    pub item_returned: bool,
    #[serde(default = "default_true")]
    pub new_offer: bool,
    #[serde(default = "default_true")]
    pub offer_accepted: bool,
    #[serde(default = "default_true")]
    pub new_follower: bool,
    #[serde(default = "default_true")]
    pub new_message: bool,
    #[serde(default = "default_true")]
    pub return_confirmed: bool,
    #[serde(default = "default_true")]
    pub new_join_request: bool,
    #[serde(default = "default_true")]
    pub new_item_request: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            new_borrow_request: true,
            request_approved: true,
            request_denied: true,
            item_returned: true,
            new_offer: true,
            offer_accepted: true,
            new_follower: true,
            new_message: true,
            return_confirmed: true,
            new_join_request: true,
            new_item_request: true,
        }
    }
}

impl NotificationPreferences {
    /// Whether delivery is enabled for the given notification type.
    #[must_use]
    pub fn allows(&self, notification_type: &super::notification::NotificationType) -> bool {
        use super::notification::NotificationType;
        match notification_type {
            NotificationType::NewBorrowRequest => self.new_borrow_request,
            NotificationType::RequestApproved => self.request_approved,
            NotificationType::RequestDenied => self.request_denied,
            NotificationType::ItemReturned => self.item_returned,
            NotificationType::NewOffer => self.new_offer,
            NotificationType::OfferAccepted => self.offer_accepted,
            NotificationType::NewFollower => self.new_follower,
            NotificationType::NewMessage => self.new_message,
            NotificationType::ReturnConfirmed => self.return_confirmed,
            NotificationType::NewJoinRequest => self.new_join_request,
            NotificationType::NewItemRequest => self.new_item_request,
        }
    }

    /// Parse from a stored JSON value, treating malformed data as all-allow.
    #[must_use]
    pub fn from_json(value: &Json) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::notification::NotificationType;

    #[test]
    fn test_absent_keys_default_to_allow() {
        let prefs = NotificationPreferences::from_json(&serde_json::json!({
            "newMessage": false
        }));
        assert!(!prefs.allows(&NotificationType::NewMessage));
        assert!(prefs.allows(&NotificationType::NewBorrowRequest));
        assert!(prefs.allows(&NotificationType::ReturnConfirmed));
    }

    #[test]
    fn test_malformed_json_defaults_to_allow() {
        let prefs = NotificationPreferences::from_json(&serde_json::json!("garbage"));
        assert_eq!(prefs, NotificationPreferences::default());
    }
}
