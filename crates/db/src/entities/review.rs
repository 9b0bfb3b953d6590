//! Review entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub reviewer_id: String,

    /// The party whose reputation this review feeds
    #[sea_orm(indexed)]
    pub reviewee_id: String,

    #[sea_orm(indexed)]
    pub borrow_request_id: String,

    /// Star rating, 1 through 5
    pub rating: i16,

    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReviewerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Reviewer,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RevieweeId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Reviewee,

    #[sea_orm(
        belongs_to = "super::borrow_request::Entity",
        from = "Column::BorrowRequestId",
        to = "super::borrow_request::Column::Id",
        on_delete = "Cascade"
    )]
    BorrowRequest,
}

impl ActiveModelBehavior for ActiveModel {}
