//! Review endpoints.

use axum::{Json, Router, extract::State, routing::post};
use lendlocal_common::AppResult;
use lendlocal_db::entities::review;
use serde::Deserialize;
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create review request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub borrow_request_id: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

async fn create_review(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateReviewRequest>,
) -> AppResult<ApiResponse<review::Model>> {
    req.validate()?;
    let review = state
        .review_service
        .create(&req.borrow_request_id, &user.id, req.rating, req.comment)
        .await?;
    Ok(ApiResponse::ok(review))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create_review))
}
