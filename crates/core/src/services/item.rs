//! Item service.

use lendlocal_common::{AppError, AppResult, IdGenerator};
use lendlocal_db::{
    entities::item::{self, AvailabilityStatus},
    repositories::{CommunityRepository, ItemRepository},
};
use sea_orm::Set;
use serde::Serialize;

/// Compact item representation embedded in other resources.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub id: String,
    pub name: String,
    pub photos: serde_json::Value,
}

impl From<&item::Model> for ItemSummary {
    fn from(model: &item::Model) -> Self {
        Self {
            id: model.id.clone(),
            name: model.name.clone(),
            photos: model.photos.clone(),
        }
    }
}

/// Item service for business logic.
#[derive(Clone)]
pub struct ItemService {
    item_repo: ItemRepository,
    community_repo: CommunityRepository,
    id_gen: IdGenerator,
}

impl ItemService {
    /// Create a new item service.
    #[must_use]
    pub const fn new(item_repo: ItemRepository, community_repo: CommunityRepository) -> Self {
        Self {
            item_repo,
            community_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List an item. Owners must be members of the community they list into.
    pub async fn create(
        &self,
        owner_id: &str,
        community_id: &str,
        name: &str,
        description: &str,
        category: &str,
        photos: Vec<String>,
    ) -> AppResult<item::Model> {
        if !self.community_repo.is_member(community_id, owner_id).await? {
            return Err(AppError::Forbidden(
                "Only community members can list items".to_string(),
            ));
        }

        let model = item::ActiveModel {
            id: Set(self.id_gen.generate()),
            owner_id: Set(owner_id.to_string()),
            community_id: Set(community_id.to_string()),
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            category: Set(category.to_string()),
            photos: Set(serde_json::json!(photos)),
            availability_status: Set(AvailabilityStatus::Available),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        self.item_repo.create(model).await
    }

    /// Get an item by ID.
    pub async fn get(&self, item_id: &str) -> AppResult<item::Model> {
        self.item_repo
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("item {item_id}")))
    }

    /// Items in a community, newest first.
    pub async fn list_by_community(&self, community_id: &str) -> AppResult<Vec<item::Model>> {
        self.item_repo.find_by_community(community_id).await
    }

    /// A user's items, newest first.
    pub async fn list_by_owner(&self, owner_id: &str) -> AppResult<Vec<item::Model>> {
        self.item_repo.find_by_owner(owner_id).await
    }

    /// Update an item's listing details. Owner only.
    pub async fn update(
        &self,
        item_id: &str,
        owner_id: &str,
        name: Option<String>,
        description: Option<String>,
        category: Option<String>,
        photos: Option<Vec<String>>,
    ) -> AppResult<item::Model> {
        let item = self.get(item_id).await?;
        if item.owner_id != owner_id {
            return Err(AppError::Forbidden(
                "Only the owner can update an item".to_string(),
            ));
        }

        let mut active: item::ActiveModel = item.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(description) = description {
            active.description = Set(description);
        }
        if let Some(category) = category {
            active.category = Set(category);
        }
        if let Some(photos) = photos {
            active.photos = Set(serde_json::json!(photos));
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.item_repo.update(active).await
    }

    /// Delete an item. Owner only; rejected while the item is out on loan.
    pub async fn delete(&self, item_id: &str, owner_id: &str) -> AppResult<()> {
        let item = self.get(item_id).await?;
        if item.owner_id != owner_id {
            return Err(AppError::Forbidden(
                "Only the owner can delete an item".to_string(),
            ));
        }
        if item.availability_status == AvailabilityStatus::Borrowed {
            return Err(AppError::InvalidState(
                "Cannot delete an item while it is borrowed".to_string(),
            ));
        }

        self.item_repo.delete(item).await
    }
}
