//! Community repository: communities, memberships, join requests.

use std::sync::Arc;

use crate::entities::{
    Community, CommunityMember, JoinRequest, community, community_member, join_request,
    join_request::JoinRequestStatus,
};
use lendlocal_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

/// Community repository for database operations.
#[derive(Clone)]
pub struct CommunityRepository {
    db: Arc<DatabaseConnection>,
}

impl CommunityRepository {
    /// Create a new community repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a community by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<community::Model>> {
        Community::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a community by invite code.
    pub async fn find_by_invite_code(&self, code: &str) -> AppResult<Option<community::Model>> {
        Community::find()
            .filter(community::Column::InviteCode.eq(code))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All communities, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<community::Model>> {
        Community::find()
            .order_by_desc(community::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Communities the user belongs to, newest membership first.
    pub async fn find_by_member(&self, user_id: &str) -> AppResult<Vec<community::Model>> {
        let memberships = CommunityMember::find()
            .filter(community_member::Column::UserId.eq(user_id))
            .order_by_desc(community_member::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let ids: Vec<String> = memberships.into_iter().map(|m| m.community_id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Community::find()
            .filter(community::Column::Id.is_in(ids))
            .order_by_desc(community::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new community.
    pub async fn create(&self, model: community::ActiveModel) -> AppResult<community::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a community.
    pub async fn update(&self, model: community::ActiveModel) -> AppResult<community::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // === Memberships ===

    /// Whether the user is a member of the community.
    pub async fn is_member(&self, community_id: &str, user_id: &str) -> AppResult<bool> {
        let count = CommunityMember::find()
            .filter(community_member::Column::CommunityId.eq(community_id))
            .filter(community_member::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Add a membership row.
    pub async fn add_member(
        &self,
        model: community_member::ActiveModel,
    ) -> AppResult<community_member::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Members of a community, oldest first.
    pub async fn find_members(&self, community_id: &str) -> AppResult<Vec<community_member::Model>> {
        CommunityMember::find()
            .filter(community_member::Column::CommunityId.eq(community_id))
            .order_by_asc(community_member::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Member count for a community.
    pub async fn count_members(&self, community_id: &str) -> AppResult<u64> {
        CommunityMember::find()
            .filter(community_member::Column::CommunityId.eq(community_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // === Join requests ===

    /// Find a join request by ID.
    pub async fn find_join_request_by_id(
        &self,
        id: &str,
    ) -> AppResult<Option<join_request::Model>> {
        JoinRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Pending join request for (community, user), if any.
    pub async fn find_pending_join_request(
        &self,
        community_id: &str,
        user_id: &str,
    ) -> AppResult<Option<join_request::Model>> {
        JoinRequest::find()
            .filter(join_request::Column::CommunityId.eq(community_id))
            .filter(join_request::Column::UserId.eq(user_id))
            .filter(join_request::Column::Status.eq(JoinRequestStatus::Pending))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Pending join requests for a community, oldest first.
    pub async fn find_pending_join_requests(
        &self,
        community_id: &str,
    ) -> AppResult<Vec<join_request::Model>> {
        JoinRequest::find()
            .filter(join_request::Column::CommunityId.eq(community_id))
            .filter(join_request::Column::Status.eq(JoinRequestStatus::Pending))
            .order_by_asc(join_request::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a join request.
    pub async fn create_join_request(
        &self,
        model: join_request::ActiveModel,
    ) -> AppResult<join_request::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a join request.
    pub async fn update_join_request(
        &self,
        model: join_request::ActiveModel,
    ) -> AppResult<join_request::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
