//! User endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use lendlocal_common::AppResult;
use lendlocal_core::{ReviewView, UserSummary};
use lendlocal_db::entities::user::{self, NotificationPreferences};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// The authenticated user's own profile.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub reputation_score: f64,
    pub notification_preferences: NotificationPreferences,
    pub email_notification_preferences: NotificationPreferences,
    pub created_at: String,
}

impl From<user::Model> for MeResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            avatar_url: u.avatar_url,
            reputation_score: u.reputation_score,
            notification_preferences: NotificationPreferences::from_json(
                &u.notification_preferences,
            ),
            email_notification_preferences: NotificationPreferences::from_json(
                &u.email_notification_preferences,
            ),
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Another user's public profile.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub reputation_score: f64,
    pub created_at: String,
}

impl From<user::Model> for ProfileResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            avatar_url: u.avatar_url,
            reputation_score: u.reputation_score,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

async fn me(AuthUser(user): AuthUser) -> ApiResponse<MeResponse> {
    ApiResponse::ok(user.into())
}

/// Update notification preferences request.
///
/// Each map replaces the stored one wholesale when present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    pub notification_preferences: Option<NotificationPreferences>,
    pub email_notification_preferences: Option<NotificationPreferences>,
}

async fn update_preferences(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdatePreferencesRequest>,
) -> AppResult<ApiResponse<MeResponse>> {
    let updated = state
        .user_service
        .update_notification_preferences(
            &user.id,
            req.notification_preferences,
            req.email_notification_preferences,
        )
        .await?;
    Ok(ApiResponse::ok(updated.into()))
}

async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let user = state.user_service.get(&user_id).await?;
    Ok(ApiResponse::ok(user.into()))
}

async fn user_reviews(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<Vec<ReviewView>>> {
    let reviews = state.review_service.list_for_user(&user_id).await?;
    Ok(ApiResponse::ok(reviews))
}

async fn followers(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<Vec<UserSummary>>> {
    let users = state.follow_service.list_followers(&user_id).await?;
    Ok(ApiResponse::ok(users))
}

async fn following(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<Vec<UserSummary>>> {
    let users = state.follow_service.list_following(&user_id).await?;
    Ok(ApiResponse::ok(users))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/me/preferences", put(update_preferences))
        .route("/{id}", get(get_user))
        .route("/{id}/reviews", get(user_reviews))
        .route("/{id}/followers", get(followers))
        .route("/{id}/following", get(following))
}
