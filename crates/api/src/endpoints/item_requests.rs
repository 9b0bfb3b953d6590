//! Item request ("wanted" post) endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use lendlocal_common::AppResult;
use lendlocal_db::entities::{borrow_request, item_offer, item_request};
use serde::Deserialize;
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create item request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequestRequest {
    pub community_id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: String,
}

async fn create_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateItemRequestRequest>,
) -> AppResult<ApiResponse<item_request::Model>> {
    req.validate()?;
    let request = state
        .item_request_service
        .create(&user.id, &req.community_id, &req.title, &req.description)
        .await?;
    Ok(ApiResponse::ok(request))
}

/// Offer payload.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddOfferRequest {
    #[validate(length(max = 1000))]
    pub message: Option<String>,
}

async fn add_offer(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(item_request_id): Path<String>,
    Json(req): Json<AddOfferRequest>,
) -> AppResult<ApiResponse<item_offer::Model>> {
    req.validate()?;
    let offer = state
        .item_request_service
        .add_offer(&item_request_id, &user.id, req.message)
        .await?;
    Ok(ApiResponse::ok(offer))
}

async fn accept_offer(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((item_request_id, offer_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<borrow_request::Model>> {
    let borrow = state
        .item_request_service
        .accept_offer(&item_request_id, &offer_id, &user.id)
        .await?;
    Ok(ApiResponse::ok(borrow))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_request))
        .route("/{id}/offers", post(add_offer))
        .route("/{id}/offers/{offer_id}/accept", post(accept_offer))
}
