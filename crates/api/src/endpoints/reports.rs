//! Report endpoints.

use axum::{Json, Router, extract::State, routing::post};
use lendlocal_common::AppResult;
use lendlocal_db::entities::report;
use serde::Deserialize;
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create report request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    #[validate(length(min = 1, max = 2000))]
    pub reason: String,
    pub reported_user_id: Option<String>,
    pub reported_item_id: Option<String>,
}

async fn create_report(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateReportRequest>,
) -> AppResult<ApiResponse<report::Model>> {
    req.validate()?;
    let report = state
        .report_service
        .create(
            &user.id,
            &req.reason,
            req.reported_user_id.as_deref(),
            req.reported_item_id.as_deref(),
        )
        .await?;
    Ok(ApiResponse::ok(report))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create_report))
}
