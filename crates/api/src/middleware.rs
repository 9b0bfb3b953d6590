//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use lendlocal_core::{
    BorrowService, ChatService, CommunityService, FollowService, ItemRequestService, ItemService,
    NotificationService, PresenceRegistry, ReportService, ReviewService, UserService,
};

use crate::streaming::StreamingState;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub item_service: ItemService,
    pub community_service: CommunityService,
    pub borrow_service: BorrowService,
    pub item_request_service: ItemRequestService,
    pub review_service: ReviewService,
    pub notification_service: NotificationService,
    pub chat_service: ChatService,
    pub follow_service: FollowService,
    pub report_service: ReportService,
    pub presence: PresenceRegistry,
    pub streaming: StreamingState,
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token into a user model stored in the request
/// extensions. Unknown or disabled tokens leave the request anonymous; the
/// `AuthUser` extractor turns that into a 401 where authentication is
/// required.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                if let Ok(Some(user)) = state.user_service.authenticate_by_token(token).await {
                    req.extensions_mut().insert(user);
                }
            }
        }
    }

    next.run(req).await
}
