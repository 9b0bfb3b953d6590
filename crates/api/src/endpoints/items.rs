//! Item endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use lendlocal_common::AppResult;
use lendlocal_db::entities::item;
use serde::Deserialize;
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create item request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub community_id: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[serde(default)]
    pub photos: Vec<String>,
}

async fn create_item(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateItemRequest>,
) -> AppResult<ApiResponse<item::Model>> {
    req.validate()?;
    let item = state
        .item_service
        .create(
            &user.id,
            &req.community_id,
            &req.name,
            &req.description,
            &req.category,
            req.photos,
        )
        .await?;
    Ok(ApiResponse::ok(item))
}

async fn my_items(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<item::Model>>> {
    let items = state.item_service.list_by_owner(&user.id).await?;
    Ok(ApiResponse::ok(items))
}

async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> AppResult<ApiResponse<item::Model>> {
    let item = state.item_service.get(&item_id).await?;
    Ok(ApiResponse::ok(item))
}

/// Update item request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    pub photos: Option<Vec<String>>,
}

async fn update_item(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(req): Json<UpdateItemRequest>,
) -> AppResult<ApiResponse<item::Model>> {
    req.validate()?;
    let item = state
        .item_service
        .update(
            &item_id,
            &user.id,
            req.name,
            req.description,
            req.category,
            req.photos,
        )
        .await?;
    Ok(ApiResponse::ok(item))
}

async fn delete_item(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.item_service.delete(&item_id, &user.id).await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_item))
        .route("/mine", get(my_items))
        .route("/{id}", get(get_item).put(update_item).delete(delete_item))
}
