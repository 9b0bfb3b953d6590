//! Report repository.

use std::sync::Arc;

use crate::entities::{Report, report};
use lendlocal_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Report repository for database operations.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new report.
    pub async fn create(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a reporter's existing report against the given target, for
    /// duplicate detection.
    pub async fn find_by_reporter_and_target(
        &self,
        reporter_id: &str,
        reported_user_id: Option<&str>,
        reported_item_id: Option<&str>,
    ) -> AppResult<Option<report::Model>> {
        let mut query =
            Report::find().filter(report::Column::ReporterId.eq(reporter_id));

        query = match reported_user_id {
            Some(id) => query.filter(report::Column::ReportedUserId.eq(id)),
            None => query.filter(report::Column::ReportedUserId.is_null()),
        };
        query = match reported_item_id {
            Some(id) => query.filter(report::Column::ReportedItemId.eq(id)),
            None => query.filter(report::Column::ReportedItemId.is_null()),
        };

        query
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
