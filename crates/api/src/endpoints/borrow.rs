//! Borrow request endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use lendlocal_common::AppResult;
use lendlocal_core::{BorrowDecision, BorrowRequestsView, ReviewInput};
use lendlocal_db::entities::borrow_request;
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create borrow request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBorrowRequest {
    pub item_id: String,
}

async fn create_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateBorrowRequest>,
) -> AppResult<ApiResponse<borrow_request::Model>> {
    let request = state
        .borrow_service
        .create_request(&req.item_id, &user.id)
        .await?;
    Ok(ApiResponse::ok(request))
}

async fn my_requests(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<BorrowRequestsView>> {
    let requests = state.borrow_service.get_requests(&user.id).await?;
    Ok(ApiResponse::ok(requests))
}

async fn get_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> AppResult<ApiResponse<borrow_request::Model>> {
    let request = state.borrow_service.find_by_id(&request_id, &user.id).await?;
    Ok(ApiResponse::ok(request))
}

/// Lender's decision payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Denied,
}

/// Respond to a borrow request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    pub decision: Decision,
}

async fn respond(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    Json(req): Json<RespondRequest>,
) -> AppResult<ApiResponse<borrow_request::Model>> {
    let decision = match req.decision {
        Decision::Approved => BorrowDecision::Approved,
        Decision::Denied => BorrowDecision::Denied,
    };
    let request = state
        .borrow_service
        .respond_to_request(&request_id, &user.id, decision)
        .await?;
    Ok(ApiResponse::ok(request))
}

/// Return step payload with an optional embedded review of the counterpart.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub rating: Option<i16>,
    pub comment: Option<String>,
}

impl ReturnRequest {
    fn into_review(self) -> Option<ReviewInput> {
        self.rating.map(|rating| ReviewInput {
            rating,
            comment: self.comment,
        })
    }
}

async fn initiate_return(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    Json(req): Json<ReturnRequest>,
) -> AppResult<ApiResponse<borrow_request::Model>> {
    let request = state
        .borrow_service
        .initiate_return(&request_id, &user.id, req.into_review())
        .await?;
    Ok(ApiResponse::ok(request))
}

async fn confirm_return(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    Json(req): Json<ReturnRequest>,
) -> AppResult<ApiResponse<borrow_request::Model>> {
    let request = state
        .borrow_service
        .confirm_return(&request_id, &user.id, req.into_review())
        .await?;
    Ok(ApiResponse::ok(request))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_request).get(my_requests))
        .route("/{id}", get(get_request))
        .route("/{id}/respond", post(respond))
        .route("/{id}/return", post(initiate_return))
        .route("/{id}/confirm", post(confirm_return))
}
