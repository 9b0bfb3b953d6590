//! Create `item_request` and `item_offer` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ItemRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ItemRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ItemRequest::RequesterId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ItemRequest::CommunityId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ItemRequest::Title).string_len(128).not_null())
                    .col(ColumnDef::new(ItemRequest::Description).text().not_null())
                    .col(
                        ColumnDef::new(ItemRequest::Status)
                            .string_len(20)
                            .not_null()
                            .default("open"),
                    )
                    .col(
                        ColumnDef::new(ItemRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(ItemRequest::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_request_requester")
                            .from(ItemRequest::Table, ItemRequest::RequesterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_request_community")
                            .from(ItemRequest::Table, ItemRequest::CommunityId)
                            .to(Community::Table, Community::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_item_request_community_status")
                    .table(ItemRequest::Table)
                    .col(ItemRequest::CommunityId)
                    .col(ItemRequest::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ItemOffer::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ItemOffer::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ItemOffer::ItemRequestId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ItemOffer::OfferedById)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ItemOffer::Message).text())
                    .col(
                        ColumnDef::new(ItemOffer::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_offer_request")
                            .from(ItemOffer::Table, ItemOffer::ItemRequestId)
                            .to(ItemRequest::Table, ItemRequest::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_offer_user")
                            .from(ItemOffer::Table, ItemOffer::OfferedById)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_item_offer_request_id")
                    .table(ItemOffer::Table)
                    .col(ItemOffer::ItemRequestId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ItemOffer::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ItemRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ItemRequest {
    Table,
    Id,
    RequesterId,
    CommunityId,
    Title,
    Description,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ItemOffer {
    Table,
    Id,
    ItemRequestId,
    OfferedById,
    Message,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Community {
    Table,
    Id,
}
