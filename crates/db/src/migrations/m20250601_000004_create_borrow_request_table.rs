//! Create `borrow_request` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BorrowRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BorrowRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BorrowRequest::ItemId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BorrowRequest::BorrowerId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BorrowRequest::LenderId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BorrowRequest::Status)
                            .string_len(24)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(BorrowRequest::RequestDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BorrowRequest::ReturnDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(BorrowRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(BorrowRequest::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_borrow_request_item")
                            .from(BorrowRequest::Table, BorrowRequest::ItemId)
                            .to(Item::Table, Item::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_borrow_request_borrower")
                            .from(BorrowRequest::Table, BorrowRequest::BorrowerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_borrow_request_lender")
                            .from(BorrowRequest::Table, BorrowRequest::LenderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_borrow_request_item_id")
                    .table(BorrowRequest::Table)
                    .col(BorrowRequest::ItemId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_borrow_request_borrower_id")
                    .table(BorrowRequest::Table)
                    .col(BorrowRequest::BorrowerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_borrow_request_lender_id")
                    .table(BorrowRequest::Table)
                    .col(BorrowRequest::LenderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_borrow_request_status")
                    .table(BorrowRequest::Table)
                    .col(BorrowRequest::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BorrowRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BorrowRequest {
    Table,
    Id,
    ItemId,
    BorrowerId,
    LenderId,
    Status,
    RequestDate,
    ReturnDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Item {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
