//! Borrow request repository.

use std::sync::Arc;

use crate::entities::{BorrowRequest, borrow_request, borrow_request::BorrowStatus};
use lendlocal_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Iterable, QueryFilter,
    QueryOrder,
};

/// Borrow request repository for database operations.
#[derive(Clone)]
pub struct BorrowRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl BorrowRequestRepository {
    /// Create a new borrow request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a borrow request by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<borrow_request::Model>> {
        BorrowRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an active (pending/approved/awaiting-confirmation) request for an
    /// item by the given borrower.
    pub async fn find_active(
        &self,
        item_id: &str,
        borrower_id: &str,
    ) -> AppResult<Option<borrow_request::Model>> {
        BorrowRequest::find()
            .filter(borrow_request::Column::ItemId.eq(item_id))
            .filter(borrow_request::Column::BorrowerId.eq(borrower_id))
            .filter(
                borrow_request::Column::Status
                    .is_in(BorrowStatus::iter().filter(BorrowStatus::is_active)),
            )
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Requests where the user is the lender, newest first.
    pub async fn find_incoming(&self, user_id: &str) -> AppResult<Vec<borrow_request::Model>> {
        BorrowRequest::find()
            .filter(borrow_request::Column::LenderId.eq(user_id))
            .order_by_desc(borrow_request::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Requests where the user is the borrower, newest first.
    pub async fn find_outgoing(&self, user_id: &str) -> AppResult<Vec<borrow_request::Model>> {
        BorrowRequest::find()
            .filter(borrow_request::Column::BorrowerId.eq(user_id))
            .order_by_desc(borrow_request::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new borrow request.
    pub async fn create(
        &self,
        model: borrow_request::ActiveModel,
    ) -> AppResult<borrow_request::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a borrow request.
    pub async fn update(
        &self,
        model: borrow_request::ActiveModel,
    ) -> AppResult<borrow_request::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
