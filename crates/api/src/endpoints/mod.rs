//! API endpoints.

mod borrow;
mod chat;
mod communities;
mod follows;
mod item_requests;
mod items;
mod notifications;
mod reports;
mod reviews;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/items", items::router())
        .nest("/communities", communities::router())
        .nest("/borrow-requests", borrow::router())
        .nest("/item-requests", item_requests::router())
        .nest("/reviews", reviews::router())
        .nest("/notifications", notifications::router())
        .nest("/chat", chat::router())
        .nest("/follows", follows::router())
        .nest("/reports", reports::router())
}
