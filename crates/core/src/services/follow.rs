//! Follow service.

use crate::services::notification::{NotificationEvent, NotificationService};
use crate::services::user::UserSummary;
use lendlocal_common::{AppError, AppResult, IdGenerator};
use lendlocal_db::{
    entities::follow,
    repositories::{FollowRepository, UserRepository},
};
use sea_orm::Set;

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    notification_service: NotificationService,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub const fn new(
        follow_repo: FollowRepository,
        user_repo: UserRepository,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            follow_repo,
            user_repo,
            notification_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow another user.
    pub async fn follow(&self, follower_id: &str, following_id: &str) -> AppResult<follow::Model> {
        if follower_id == following_id {
            return Err(AppError::BadRequest(
                "You cannot follow yourself".to_string(),
            ));
        }

        self.user_repo
            .find_by_id(following_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(following_id.to_string()))?;

        if self
            .follow_repo
            .find_pair(follower_id, following_id)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest(
                "You are already following this user".to_string(),
            ));
        }

        let edge = self
            .follow_repo
            .create(follow::ActiveModel {
                id: Set(self.id_gen.generate()),
                follower_id: Set(follower_id.to_string()),
                following_id: Set(following_id.to_string()),
                created_at: Set(chrono::Utc::now().into()),
            })
            .await?;

        self.notification_service
            .notify(
                following_id,
                follower_id,
                NotificationEvent::NewFollower,
                "started following you",
                &format!("/users/{follower_id}"),
            )
            .await?;

        Ok(edge)
    }

    /// Unfollow a user.
    pub async fn unfollow(&self, follower_id: &str, following_id: &str) -> AppResult<()> {
        let edge = self
            .follow_repo
            .find_pair(follower_id, following_id)
            .await?
            .ok_or_else(|| AppError::NotFound("You are not following this user".to_string()))?;

        self.follow_repo.delete(edge).await
    }

    /// Users following the given user.
    pub async fn list_followers(&self, user_id: &str) -> AppResult<Vec<UserSummary>> {
        let edges = self.follow_repo.find_followers(user_id).await?;
        let ids: Vec<String> = edges.into_iter().map(|e| e.follower_id).collect();
        self.summaries(&ids).await
    }

    /// Users the given user follows.
    pub async fn list_following(&self, user_id: &str) -> AppResult<Vec<UserSummary>> {
        let edges = self.follow_repo.find_following(user_id).await?;
        let ids: Vec<String> = edges.into_iter().map(|e| e.following_id).collect();
        self.summaries(&ids).await
    }

    /// Whether the follow edge exists.
    pub async fn is_following(&self, follower_id: &str, following_id: &str) -> AppResult<bool> {
        Ok(self
            .follow_repo
            .find_pair(follower_id, following_id)
            .await?
            .is_some())
    }

    async fn summaries(&self, ids: &[String]) -> AppResult<Vec<UserSummary>> {
        let users = self.user_repo.find_by_ids(ids).await?;
        // Preserve the edge ordering, not the lookup ordering.
        Ok(ids
            .iter()
            .filter_map(|id| users.iter().find(|u| &u.id == id).map(UserSummary::from))
            .collect())
    }
}
