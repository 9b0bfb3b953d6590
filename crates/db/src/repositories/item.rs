//! Item repository.

use std::sync::Arc;

use crate::entities::{Item, item, item::AvailabilityStatus};
use lendlocal_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder,
};

/// Item repository for database operations.
#[derive(Clone)]
pub struct ItemRepository {
    db: Arc<DatabaseConnection>,
}

impl ItemRepository {
    /// Create a new item repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an item by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<item::Model>> {
        Item::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List items in a community, newest first.
    pub async fn find_by_community(&self, community_id: &str) -> AppResult<Vec<item::Model>> {
        Item::find()
            .filter(item::Column::CommunityId.eq(community_id))
            .order_by_desc(item::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List a user's items, newest first.
    pub async fn find_by_owner(&self, owner_id: &str) -> AppResult<Vec<item::Model>> {
        Item::find()
            .filter(item::Column::OwnerId.eq(owner_id))
            .order_by_desc(item::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Load items by ID, for assembling summaries in bulk.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<item::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Item::find()
            .filter(item::Column::Id.is_in(ids.iter().map(String::as_str)))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new item.
    pub async fn create(&self, model: item::ActiveModel) -> AppResult<item::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an item.
    pub async fn update(&self, model: item::ActiveModel) -> AppResult<item::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an item.
    pub async fn delete(&self, model: item::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Flip availability with a conditional single-statement update.
    ///
    /// Returns the number of rows affected: 0 means the item was not in the
    /// expected state, so the caller lost a concurrent race (or the state had
    /// already moved on).
    pub async fn set_availability(
        &self,
        id: &str,
        expected: AvailabilityStatus,
        next: AvailabilityStatus,
    ) -> AppResult<u64> {
        let result = Item::update_many()
            .filter(item::Column::Id.eq(id))
            .filter(item::Column::AvailabilityStatus.eq(expected))
            .col_expr(item::Column::AvailabilityStatus, next.into())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
