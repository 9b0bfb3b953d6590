//! Community endpoints, including join requests.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use lendlocal_common::AppResult;
use lendlocal_core::{CommunityDetailView, CommunityView, ItemRequestView, JoinRequestView};
use lendlocal_db::entities::{community, item, join_request};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create community request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommunityRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: String,
}

async fn create_community(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCommunityRequest>,
) -> AppResult<ApiResponse<community::Model>> {
    req.validate()?;
    let community = state
        .community_service
        .create(&user.id, &req.name, &req.description)
        .await?;
    Ok(ApiResponse::ok(community))
}

async fn list_communities(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<CommunityView>>> {
    let communities = state.community_service.list(&user.id).await?;
    Ok(ApiResponse::ok(communities))
}

async fn my_communities(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<CommunityView>>> {
    let communities = state.community_service.list_mine(&user.id).await?;
    Ok(ApiResponse::ok(communities))
}

async fn get_community(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(community_id): Path<String>,
) -> AppResult<ApiResponse<CommunityDetailView>> {
    let view = state.community_service.get(&community_id, &user.id).await?;
    Ok(ApiResponse::ok(view))
}

/// Update community request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommunityRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

async fn update_community(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(community_id): Path<String>,
    Json(req): Json<UpdateCommunityRequest>,
) -> AppResult<ApiResponse<community::Model>> {
    req.validate()?;
    let community = state
        .community_service
        .update(&community_id, &user.id, req.name, req.description)
        .await?;
    Ok(ApiResponse::ok(community))
}

/// Invite code response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteCodeResponse {
    pub invite_code: String,
}

async fn invite_code(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(community_id): Path<String>,
) -> AppResult<ApiResponse<InviteCodeResponse>> {
    let invite_code = state
        .community_service
        .invite_code(&community_id, &user.id)
        .await?;
    Ok(ApiResponse::ok(InviteCodeResponse { invite_code }))
}

/// Join by invite code request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinByCodeRequest {
    #[validate(length(equal = 6))]
    pub invite_code: String,
}

async fn join_by_code(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<JoinByCodeRequest>,
) -> AppResult<ApiResponse<community::Model>> {
    req.validate()?;
    let community = state
        .community_service
        .join_by_code(&req.invite_code, &user.id)
        .await?;
    Ok(ApiResponse::ok(community))
}

async fn request_to_join(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(community_id): Path<String>,
) -> AppResult<ApiResponse<join_request::Model>> {
    let request = state
        .community_service
        .request_to_join(&community_id, &user.id)
        .await?;
    Ok(ApiResponse::ok(request))
}

async fn list_join_requests(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(community_id): Path<String>,
) -> AppResult<ApiResponse<Vec<JoinRequestView>>> {
    let requests = state
        .community_service
        .list_join_requests(&community_id, &user.id)
        .await?;
    Ok(ApiResponse::ok(requests))
}

/// Respond to a join request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondJoinRequest {
    pub approve: bool,
}

async fn respond_to_join_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(join_request_id): Path<String>,
    Json(req): Json<RespondJoinRequest>,
) -> AppResult<ApiResponse<join_request::Model>> {
    let request = state
        .community_service
        .respond_to_join_request(&join_request_id, &user.id, req.approve)
        .await?;
    Ok(ApiResponse::ok(request))
}

async fn community_items(
    State(state): State<AppState>,
    Path(community_id): Path<String>,
) -> AppResult<ApiResponse<Vec<item::Model>>> {
    let items = state.item_service.list_by_community(&community_id).await?;
    Ok(ApiResponse::ok(items))
}

async fn community_item_requests(
    State(state): State<AppState>,
    Path(community_id): Path<String>,
) -> AppResult<ApiResponse<Vec<ItemRequestView>>> {
    let requests = state.item_request_service.list_open(&community_id).await?;
    Ok(ApiResponse::ok(requests))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_community).get(list_communities))
        .route("/mine", get(my_communities))
        .route("/join", post(join_by_code))
        .route("/join-requests/{id}/respond", post(respond_to_join_request))
        .route("/{id}", get(get_community).put(update_community))
        .route("/{id}/invite-code", get(invite_code))
        .route(
            "/{id}/join-requests",
            post(request_to_join).get(list_join_requests),
        )
        .route("/{id}/items", get(community_items))
        .route("/{id}/item-requests", get(community_item_requests))
}
