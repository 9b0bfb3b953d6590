//! Review repository.

use std::sync::Arc;

use crate::entities::{Review, review};
use lendlocal_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Review repository for database operations.
#[derive(Clone)]
pub struct ReviewRepository {
    db: Arc<DatabaseConnection>,
}

impl ReviewRepository {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new review.
    pub async fn create(&self, model: review::ActiveModel) -> AppResult<review::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a review by request and reviewer, for duplicate detection.
    pub async fn find_by_request_and_reviewer(
        &self,
        borrow_request_id: &str,
        reviewer_id: &str,
    ) -> AppResult<Option<review::Model>> {
        Review::find()
            .filter(review::Column::BorrowRequestId.eq(borrow_request_id))
            .filter(review::Column::ReviewerId.eq(reviewer_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Reviews received by a user, newest first.
    pub async fn find_by_reviewee(&self, reviewee_id: &str) -> AppResult<Vec<review::Model>> {
        Review::find()
            .filter(review::Column::RevieweeId.eq(reviewee_id))
            .order_by_desc(review::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All ratings received by a user, for reputation recompute.
    pub async fn ratings_for_user(&self, reviewee_id: &str) -> AppResult<Vec<i16>> {
        Review::find()
            .select_only()
            .column(review::Column::Rating)
            .filter(review::Column::RevieweeId.eq(reviewee_id))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
