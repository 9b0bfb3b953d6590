//! User and item report entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What a report points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum ReportType {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "item")]
    Item,
}

/// Moderation lifecycle of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ReportStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "under_review")]
    UnderReview,
    #[sea_orm(string_value = "resolved")]
    Resolved,
    #[sea_orm(string_value = "dismissed")]
    Dismissed,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub reporter_id: String,

    /// Set when a user is reported
    #[sea_orm(nullable)]
    pub reported_user_id: Option<String>,

    /// Set when an item is reported
    #[sea_orm(nullable)]
    pub reported_item_id: Option<String>,

    pub report_type: ReportType,

    #[sea_orm(column_type = "Text")]
    pub reason: String,

    pub status: ReportStatus,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReporterId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Reporter,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReportedUserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    ReportedUser,

    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ReportedItemId",
        to = "super::item::Column::Id",
        on_delete = "Cascade"
    )]
    ReportedItem,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReportedItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
