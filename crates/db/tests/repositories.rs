//! Repository tests against a mock database.

#![allow(clippy::unwrap_used)]

use lendlocal_db::entities::{
    Community, community,
    item::{self, AvailabilityStatus},
    user,
};
use lendlocal_db::repositories::{ItemRepository, UserRepository};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, ModelTrait};
use std::sync::Arc;

fn sample_user(id: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        name: "Alice".to_string(),
        email: format!("{id}@example.com"),
        avatar_url: None,
        token: format!("token-{id}"),
        reputation_score: 5.0,
        is_disabled: false,
        notification_preferences: serde_json::json!({}),
        email_notification_preferences: serde_json::json!({}),
        created_at: chrono::Utc::now().into(),
        updated_at: None,
    }
}

fn sample_item(id: &str, status: AvailabilityStatus) -> item::Model {
    item::Model {
        id: id.to_string(),
        owner_id: "u1".to_string(),
        community_id: "c1".to_string(),
        name: "Ladder".to_string(),
        description: "A sturdy ladder".to_string(),
        category: "tools".to_string(),
        photos: serde_json::json!([]),
        availability_status: status,
        created_at: chrono::Utc::now().into(),
        updated_at: None,
    }
}

fn sample_community() -> community::Model {
    community::Model {
        id: "c1".to_string(),
        owner_id: "u1".to_string(),
        name: "Maple Street".to_string(),
        description: "Neighbourhood tools".to_string(),
        invite_code: "ABC234".to_string(),
        created_at: chrono::Utc::now().into(),
        updated_at: None,
    }
}

#[tokio::test]
async fn test_find_by_token_maps_row() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_user("u1")]])
        .into_connection();
    let repo = UserRepository::new(Arc::new(db));

    let user = repo.find_by_token("token-u1").await.unwrap();
    assert_eq!(user.unwrap().id, "u1");
}

#[tokio::test]
async fn test_find_by_token_unknown_is_none() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();
    let repo = UserRepository::new(Arc::new(db));

    let user = repo.find_by_token("nope").await.unwrap();
    assert!(user.is_none());
}

#[tokio::test]
async fn test_find_by_ids_empty_does_not_query() {
    // No results are prepared; the call only succeeds if the repository
    // short-circuits on an empty ID list.
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo = UserRepository::new(Arc::new(db));

    let users = repo.find_by_ids(&[]).await.unwrap();
    assert!(users.is_empty());
}

#[tokio::test]
async fn test_set_availability_reports_rows_affected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ])
        .into_connection();
    let repo = ItemRepository::new(Arc::new(db));

    let flipped = repo
        .set_availability("i1", AvailabilityStatus::Available, AvailabilityStatus::Borrowed)
        .await
        .unwrap();
    assert_eq!(flipped, 1);

    // The same flip again finds the item no longer in the expected state.
    let flipped = repo
        .set_availability("i1", AvailabilityStatus::Available, AvailabilityStatus::Borrowed)
        .await
        .unwrap();
    assert_eq!(flipped, 0);
}

#[tokio::test]
async fn test_item_resolves_its_community() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_community()]])
        .into_connection();

    let item = sample_item("i1", AvailabilityStatus::Available);
    let community = item.find_related(Community).one(&db).await.unwrap();
    assert_eq!(community.unwrap().id, "c1");
}

#[tokio::test]
async fn test_find_by_community_maps_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            sample_item("i2", AvailabilityStatus::Available),
            sample_item("i1", AvailabilityStatus::Borrowed),
        ]])
        .into_connection();
    let repo = ItemRepository::new(Arc::new(db));

    let items = repo.find_by_community("c1").await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, "i2");
    assert_eq!(items[1].availability_status, AvailabilityStatus::Borrowed);
}
