//! Item request and offer repository.

use std::sync::Arc;

use crate::entities::{
    ItemOffer, ItemRequest, item_offer, item_request, item_request::ItemRequestStatus,
};
use lendlocal_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Item request repository for database operations.
#[derive(Clone)]
pub struct ItemRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl ItemRequestRepository {
    /// Create a new item request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an item request by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<item_request::Model>> {
        ItemRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Open requests in a community, newest first.
    pub async fn find_open_by_community(
        &self,
        community_id: &str,
    ) -> AppResult<Vec<item_request::Model>> {
        ItemRequest::find()
            .filter(item_request::Column::CommunityId.eq(community_id))
            .filter(item_request::Column::Status.eq(ItemRequestStatus::Open))
            .order_by_desc(item_request::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new item request.
    pub async fn create(&self, model: item_request::ActiveModel) -> AppResult<item_request::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an item request.
    pub async fn update(&self, model: item_request::ActiveModel) -> AppResult<item_request::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create an offer on an item request.
    pub async fn create_offer(&self, model: item_offer::ActiveModel) -> AppResult<item_offer::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an offer by ID.
    pub async fn find_offer_by_id(&self, id: &str) -> AppResult<Option<item_offer::Model>> {
        ItemOffer::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Offers on a request, oldest first.
    pub async fn find_offers(&self, item_request_id: &str) -> AppResult<Vec<item_offer::Model>> {
        ItemOffer::find()
            .filter(item_offer::Column::ItemRequestId.eq(item_request_id))
            .order_by_asc(item_offer::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
