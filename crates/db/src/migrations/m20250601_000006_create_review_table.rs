//! Create review table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Review::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Review::ReviewerId).string_len(32).not_null())
                    .col(ColumnDef::new(Review::RevieweeId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Review::BorrowRequestId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Review::Rating).small_integer().not_null())
                    .col(ColumnDef::new(Review::Comment).text())
                    .col(
                        ColumnDef::new(Review::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_reviewer")
                            .from(Review::Table, Review::ReviewerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_reviewee")
                            .from(Review::Table, Review::RevieweeId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_borrow_request")
                            .from(Review::Table, Review::BorrowRequestId)
                            .to(BorrowRequest::Table, BorrowRequest::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_review_reviewee_id")
                    .table(Review::Table)
                    .col(Review::RevieweeId)
                    .to_owned(),
            )
            .await?;

        // One review per party per borrow request
        manager
            .create_index(
                Index::create()
                    .name("idx_review_request_reviewer_unique")
                    .table(Review::Table)
                    .col(Review::BorrowRequestId)
                    .col(Review::ReviewerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Review::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Review {
    Table,
    Id,
    ReviewerId,
    RevieweeId,
    BorrowRequestId,
    Rating,
    Comment,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum BorrowRequest {
    Table,
    Id,
}
