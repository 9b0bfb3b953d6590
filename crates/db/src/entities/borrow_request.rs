//! Borrow request entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Borrow request lifecycle states.
///
/// ```text
/// pending -> approved -> awaiting_confirmation -> returned
///         -> denied
///         -> cancelled
/// ```
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
pub enum BorrowStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "denied")]
    Denied,
    #[sea_orm(string_value = "awaiting_confirmation")]
    AwaitingConfirmation,
    #[sea_orm(string_value = "returned")]
    Returned,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl BorrowStatus {
    /// Whether this state blocks a new request for the same (item, borrower).
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Approved | Self::AwaitingConfirmation
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "borrow_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub item_id: String,

    #[sea_orm(indexed)]
    pub borrower_id: String,

    /// Snapshot of the item owner at creation time
    #[sea_orm(indexed)]
    pub lender_id: String,

    pub status: BorrowStatus,

    pub request_date: DateTimeWithTimeZone,

    /// Set when the lender confirms the return
    #[sea_orm(nullable)]
    pub return_date: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id",
        on_delete = "Cascade"
    )]
    Item,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::BorrowerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Borrower,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::LenderId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Lender,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_states() {
        assert!(BorrowStatus::Pending.is_active());
        assert!(BorrowStatus::Approved.is_active());
        assert!(BorrowStatus::AwaitingConfirmation.is_active());
        assert!(!BorrowStatus::Denied.is_active());
        assert!(!BorrowStatus::Returned.is_active());
        assert!(!BorrowStatus::Cancelled.is_active());
    }
}
