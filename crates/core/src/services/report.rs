//! Report service.
//!
//! Users can flag another user or a listed item for moderation. Reports are
//! write-only from the member-facing API; they open in `open` status and wait
//! for out-of-band review.

use lendlocal_common::{AppError, AppResult, IdGenerator};
use lendlocal_db::{
    entities::report::{self, ReportStatus, ReportType},
    repositories::{ItemRepository, ReportRepository, UserRepository},
};
use sea_orm::Set;

/// Report service for business logic.
#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    user_repo: UserRepository,
    item_repo: ItemRepository,
    id_gen: IdGenerator,
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub const fn new(
        report_repo: ReportRepository,
        user_repo: UserRepository,
        item_repo: ItemRepository,
    ) -> Self {
        Self {
            report_repo,
            user_repo,
            item_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a report against a user or an item.
    ///
    /// Exactly one submission per (reporter, target) is accepted. A user
    /// target takes precedence for the recorded report type when both are
    /// given.
    pub async fn create(
        &self,
        reporter_id: &str,
        reason: &str,
        reported_user_id: Option<&str>,
        reported_item_id: Option<&str>,
    ) -> AppResult<report::Model> {
        if reported_user_id.is_none() && reported_item_id.is_none() {
            return Err(AppError::BadRequest(
                "A report must name a user or an item".to_string(),
            ));
        }

        if reported_user_id == Some(reporter_id) {
            return Err(AppError::BadRequest(
                "You cannot report yourself".to_string(),
            ));
        }

        if let Some(user_id) = reported_user_id {
            self.user_repo
                .find_by_id(user_id)
                .await?
                .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;
        }
        if let Some(item_id) = reported_item_id {
            self.item_repo
                .find_by_id(item_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("item {item_id}")))?;
        }

        if self
            .report_repo
            .find_by_reporter_and_target(reporter_id, reported_user_id, reported_item_id)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest(
                "You have already reported this".to_string(),
            ));
        }

        let report_type = if reported_user_id.is_some() {
            ReportType::User
        } else {
            ReportType::Item
        };

        self.report_repo
            .create(report::ActiveModel {
                id: Set(self.id_gen.generate()),
                reporter_id: Set(reporter_id.to_string()),
                reported_user_id: Set(reported_user_id.map(ToString::to_string)),
                reported_item_id: Set(reported_item_id.map(ToString::to_string)),
                report_type: Set(report_type),
                reason: Set(reason.to_string()),
                status: Set(ReportStatus::Open),
                created_at: Set(chrono::Utc::now().into()),
                updated_at: Set(None),
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service(db: sea_orm::DatabaseConnection) -> ReportService {
        let db = Arc::new(db);
        ReportService::new(
            ReportRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            ItemRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_report_requires_a_target() {
        // No prepared results: the check rejects before any query.
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = svc.create("u1", "spam", None, None).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_self_report_rejected() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = svc.create("u1", "spam", Some("u1"), None).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
