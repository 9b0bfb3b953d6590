//! Offer on an item request.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item_offer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub item_request_id: String,

    #[sea_orm(indexed)]
    pub offered_by_id: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub message: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item_request::Entity",
        from = "Column::ItemRequestId",
        to = "super::item_request::Column::Id",
        on_delete = "Cascade"
    )]
    ItemRequest,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OfferedById",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    OfferedBy,
}

impl Related<super::item_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
