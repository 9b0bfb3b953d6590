//! Follow endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use lendlocal_common::AppResult;
use lendlocal_db::entities::follow;
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

async fn follow_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<follow::Model>> {
    let edge = state.follow_service.follow(&user.id, &user_id).await?;
    Ok(ApiResponse::ok(edge))
}

async fn unfollow_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.follow_service.unfollow(&user.id, &user_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Follow status response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatusResponse {
    pub following: bool,
}

async fn follow_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<FollowStatusResponse>> {
    let following = state.follow_service.is_following(&user.id, &user_id).await?;
    Ok(ApiResponse::ok(FollowStatusResponse { following }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", post(follow_user).delete(unfollow_user))
        .route("/{id}/status", get(follow_status))
}
