//! API integration tests.
//!
//! These exercise the router, auth middleware, and extractors against a mock
//! database.

#![allow(clippy::unwrap_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware,
};
use lendlocal_api::{StreamingState, middleware::AppState, router as api_router};
use lendlocal_core::{
    BorrowService, ChatService, CommunityService, FollowService, ItemRequestService, ItemService,
    NotificationService, PresenceRegistry, ReportService, ReviewService, UserService,
};
use lendlocal_db::entities::user;
use lendlocal_db::repositories::{
    BorrowRequestRepository, ChatRepository, CommunityRepository, FollowRepository,
    ItemRepository, ItemRequestRepository, NotificationRepository, ReportRepository,
    ReviewRepository, UserRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;

fn sample_user(id: &str, is_disabled: bool) -> user::Model {
    user::Model {
        id: id.to_string(),
        name: "Alice".to_string(),
        email: format!("{id}@example.com"),
        avatar_url: None,
        token: format!("token-{id}"),
        reputation_score: 4.5,
        is_disabled,
        notification_preferences: serde_json::json!({}),
        email_notification_preferences: serde_json::json!({}),
        created_at: chrono::Utc::now().into(),
        updated_at: None,
    }
}

fn build_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let item_repo = ItemRepository::new(Arc::clone(&db));
    let borrow_repo = BorrowRequestRepository::new(Arc::clone(&db));
    let item_request_repo = ItemRequestRepository::new(Arc::clone(&db));
    let review_repo = ReviewRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let chat_repo = ChatRepository::new(Arc::clone(&db));
    let community_repo = CommunityRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));
    let report_repo = ReportRepository::new(Arc::clone(&db));

    let notification_service = NotificationService::new(
        notification_repo.clone(),
        user_repo.clone(),
        "http://localhost:5173".to_string(),
    );
    let presence = PresenceRegistry::new();
    let streaming = StreamingState::new();

    let review_service = ReviewService::new(
        review_repo.clone(),
        borrow_repo.clone(),
        user_repo.clone(),
    );

    AppState {
        user_service: UserService::new(user_repo.clone()),
        item_service: ItemService::new(item_repo.clone(), community_repo.clone()),
        community_service: CommunityService::new(
            community_repo.clone(),
            user_repo.clone(),
            notification_service.clone(),
        ),
        borrow_service: BorrowService::new(
            borrow_repo.clone(),
            item_repo.clone(),
            user_repo.clone(),
            review_service.clone(),
            notification_service.clone(),
        ),
        item_request_service: ItemRequestService::new(
            item_request_repo,
            item_repo.clone(),
            borrow_repo,
            community_repo,
            user_repo.clone(),
            notification_service.clone(),
        ),
        review_service,
        notification_service: notification_service.clone(),
        chat_service: ChatService::new(
            chat_repo,
            user_repo.clone(),
            notification_repo,
            notification_service.clone(),
            presence.clone(),
        ),
        follow_service: FollowService::new(
            follow_repo,
            user_repo.clone(),
            notification_service,
        ),
        report_service: ReportService::new(report_repo, user_repo, item_repo),
        presence,
        streaming,
    }
}

fn build_app(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            lendlocal_api::middleware::auth_middleware,
        ))
        .with_state(state)
}

#[tokio::test]
async fn test_me_requires_auth() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = build_app(build_state(db));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_resolves_bearer_token() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_user("u1", false)]])
        .into_connection();
    let app = build_app(build_state(db));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users/me")
                .header("Authorization", "Bearer token-u1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let data = &json["data"];
    assert_eq!(data["id"], "u1");
    assert_eq!(data["reputationScore"], 4.5);
    // The API token never appears in a response body.
    assert!(data.get("token").is_none());
}

#[tokio::test]
async fn test_disabled_account_cannot_authenticate() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_user("u1", true)]])
        .into_connection();
    let app = build_app(build_state(db));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users/me")
                .header("Authorization", "Bearer token-u1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_self_report_is_rejected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_user("u1", false)]])
        .into_connection();
    let app = build_app(build_state(db));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/reports")
                .header("Authorization", "Bearer token-u1")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"reason":"spam","reportedUserId":"u1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_bearer_scheme_is_anonymous() {
    // No query results prepared: a non-Bearer header must not hit the DB.
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = build_app(build_state(db));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users/me")
                .header("Authorization", "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
