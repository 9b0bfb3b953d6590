//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_user_table;
mod m20250601_000002_create_community_tables;
mod m20250601_000003_create_item_table;
mod m20250601_000004_create_borrow_request_table;
mod m20250601_000005_create_item_request_tables;
mod m20250601_000006_create_review_table;
mod m20250601_000007_create_notification_table;
mod m20250601_000008_create_chat_tables;
mod m20250601_000009_create_follow_table;
mod m20250601_000010_create_report_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_user_table::Migration),
            Box::new(m20250601_000002_create_community_tables::Migration),
            Box::new(m20250601_000003_create_item_table::Migration),
            Box::new(m20250601_000004_create_borrow_request_table::Migration),
            Box::new(m20250601_000005_create_item_request_tables::Migration),
            Box::new(m20250601_000006_create_review_table::Migration),
            Box::new(m20250601_000007_create_notification_table::Migration),
            Box::new(m20250601_000008_create_chat_tables::Migration),
            Box::new(m20250601_000009_create_follow_table::Migration),
            Box::new(m20250601_000010_create_report_table::Migration),
        ]
    }
}
