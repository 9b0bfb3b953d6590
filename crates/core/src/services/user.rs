//! User service.

use lendlocal_common::{AppError, AppResult};
use lendlocal_db::{
    entities::user::{self, NotificationPreferences},
    repositories::UserRepository,
};
use sea_orm::Set;
use serde::Serialize;

/// Compact user representation embedded in other resources.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl From<&user::Model> for UserSummary {
    fn from(model: &user::Model) -> Self {
        Self {
            id: model.id.clone(),
            name: model.name.clone(),
            avatar_url: model.avatar_url.clone(),
        }
    }
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Resolve an API token to its user, for the auth middleware.
    ///
    /// Disabled accounts resolve to `None` like unknown tokens; session
    /// issuance itself happens outside this service.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        let user = self.user_repo.find_by_token(token).await?;
        Ok(user.filter(|u| !u.is_disabled))
    }

    /// Get a user by ID.
    pub async fn get(&self, user_id: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))
    }

    /// Update per-type notification preferences.
    ///
    /// Each map is replaced wholesale when provided; `None` leaves the stored
    /// map untouched.
    pub async fn update_notification_preferences(
        &self,
        user_id: &str,
        site: Option<NotificationPreferences>,
        email: Option<NotificationPreferences>,
    ) -> AppResult<user::Model> {
        let user = self.get(user_id).await?;

        let mut active: user::ActiveModel = user.into();
        if let Some(site) = site {
            active.notification_preferences = Set(serde_json::to_value(site)
                .map_err(|e| AppError::Internal(e.to_string()))?);
        }
        if let Some(email) = email {
            active.email_notification_preferences = Set(serde_json::to_value(email)
                .map_err(|e| AppError::Internal(e.to_string()))?);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await
    }
}
