//! Borrow lifecycle service.
//!
//! Drives the borrow-request state machine:
//!
//! ```text
//! pending -> approved -> awaiting_confirmation -> returned
//!         -> denied
//! ```
//!
//! Item availability flips ride on conditional updates so two concurrent
//! approvals of the same item cannot both succeed.

use crate::services::item::ItemSummary;
use crate::services::notification::{NotificationEvent, NotificationService};
use crate::services::review::ReviewService;
use crate::services::user::UserSummary;
use lendlocal_common::{AppError, AppResult, IdGenerator};
use lendlocal_db::{
    entities::{
        borrow_request::{self, BorrowStatus},
        item::AvailabilityStatus,
    },
    repositories::{BorrowRequestRepository, ItemRepository, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;

/// Lender's decision on a pending borrow request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowDecision {
    Approved,
    Denied,
}

/// Optional review submitted alongside a return step.
#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub rating: i16,
    pub comment: Option<String>,
}

/// A borrow request with its counterpart user and item summaries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequestView {
    #[serde(flatten)]
    pub request: borrow_request::Model,
    pub counterpart: Option<UserSummary>,
    pub item: Option<ItemSummary>,
}

/// Incoming and outgoing requests for one user.
#[derive(Debug, Clone, Serialize)]
pub struct BorrowRequestsView {
    pub incoming: Vec<BorrowRequestView>,
    pub outgoing: Vec<BorrowRequestView>,
}

/// Borrow service for business logic.
#[derive(Clone)]
pub struct BorrowService {
    borrow_repo: BorrowRequestRepository,
    item_repo: ItemRepository,
    user_repo: UserRepository,
    review_service: ReviewService,
    notification_service: NotificationService,
    id_gen: IdGenerator,
}

impl BorrowService {
    /// Create a new borrow service.
    #[must_use]
    pub const fn new(
        borrow_repo: BorrowRequestRepository,
        item_repo: ItemRepository,
        user_repo: UserRepository,
        review_service: ReviewService,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            borrow_repo,
            item_repo,
            user_repo,
            review_service,
            notification_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Ask to borrow an item.
    pub async fn create_request(
        &self,
        item_id: &str,
        borrower_id: &str,
    ) -> AppResult<borrow_request::Model> {
        let item = self
            .item_repo
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("item {item_id}")))?;

        if item.owner_id == borrower_id {
            return Err(AppError::BadRequest(
                "You cannot borrow your own item".to_string(),
            ));
        }

        if item.availability_status != AvailabilityStatus::Available {
            return Err(AppError::InvalidState(
                "This item is currently borrowed".to_string(),
            ));
        }

        if self
            .borrow_repo
            .find_active(item_id, borrower_id)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest(
                "You already have an active request for this item".to_string(),
            ));
        }

        let now = chrono::Utc::now();
        let model = borrow_request::ActiveModel {
            id: Set(self.id_gen.generate()),
            item_id: Set(item_id.to_string()),
            borrower_id: Set(borrower_id.to_string()),
            lender_id: Set(item.owner_id.clone()),
            status: Set(BorrowStatus::Pending),
            request_date: Set(now.into()),
            return_date: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let request = self.borrow_repo.create(model).await?;

        self.notification_service
            .notify(
                &item.owner_id,
                borrower_id,
                NotificationEvent::NewBorrowRequest {
                    item_name: item.name.clone(),
                },
                &format!("wants to borrow your {}", item.name),
                "/requests",
            )
            .await?;

        Ok(request)
    }

    /// Approve or deny a pending request. Lender only.
    pub async fn respond_to_request(
        &self,
        request_id: &str,
        lender_id: &str,
        decision: BorrowDecision,
    ) -> AppResult<borrow_request::Model> {
        let request = self.find_request(request_id).await?;

        if request.lender_id != lender_id {
            return Err(AppError::Forbidden(
                "Only the lender can respond to this request".to_string(),
            ));
        }

        if request.status != BorrowStatus::Pending {
            return Err(AppError::InvalidState(
                "This request has already been resolved".to_string(),
            ));
        }

        let (next_status, event, message) = match decision {
            BorrowDecision::Approved => {
                // Conditional flip: if another approval got here first the
                // item is no longer available and this request stays pending.
                let flipped = self
                    .item_repo
                    .set_availability(
                        &request.item_id,
                        AvailabilityStatus::Available,
                        AvailabilityStatus::Borrowed,
                    )
                    .await?;
                if flipped == 0 {
                    return Err(AppError::InvalidState(
                        "This item is no longer available".to_string(),
                    ));
                }
                (
                    BorrowStatus::Approved,
                    NotificationEvent::RequestApproved {
                        item_name: self.item_name(&request.item_id).await?,
                    },
                    "approved your borrow request",
                )
            }
            BorrowDecision::Denied => (
                BorrowStatus::Denied,
                NotificationEvent::RequestDenied {
                    item_name: self.item_name(&request.item_id).await?,
                },
                "declined your borrow request",
            ),
        };

        let borrower_id = request.borrower_id.clone();
        let mut active: borrow_request::ActiveModel = request.into();
        active.status = Set(next_status);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        let updated = self.borrow_repo.update(active).await?;

        self.notification_service
            .notify(&borrower_id, lender_id, event, message, "/requests")
            .await?;

        Ok(updated)
    }

    /// Borrower hands the item back, optionally reviewing the lender.
    pub async fn initiate_return(
        &self,
        request_id: &str,
        borrower_id: &str,
        review: Option<ReviewInput>,
    ) -> AppResult<borrow_request::Model> {
        let request = self.find_request(request_id).await?;

        if request.borrower_id != borrower_id {
            return Err(AppError::Forbidden(
                "Only the borrower can initiate a return".to_string(),
            ));
        }

        if request.status != BorrowStatus::Approved {
            return Err(AppError::InvalidState(
                "Only an approved loan can be returned".to_string(),
            ));
        }

        let lender_id = request.lender_id.clone();
        let item_id = request.item_id.clone();

        // The embedded review runs before the status transition: a rejected
        // rating must leave the request untouched so the caller can retry.
        if let Some(review) = review {
            self.review_service
                .submit(
                    request_id,
                    borrower_id,
                    &lender_id,
                    review.rating,
                    review.comment,
                )
                .await?;
        }

        let mut active: borrow_request::ActiveModel = request.into();
        active.status = Set(BorrowStatus::AwaitingConfirmation);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        let updated = self.borrow_repo.update(active).await?;

        let item_name = self.item_name(&item_id).await?;
        self.notification_service
            .notify(
                &lender_id,
                borrower_id,
                NotificationEvent::ItemReturned {
                    item_name: item_name.clone(),
                },
                &format!("marked {item_name} as returned"),
                "/requests",
            )
            .await?;

        Ok(updated)
    }

    /// Lender confirms the item came back, optionally reviewing the borrower.
    pub async fn confirm_return(
        &self,
        request_id: &str,
        lender_id: &str,
        review: Option<ReviewInput>,
    ) -> AppResult<borrow_request::Model> {
        let request = self.find_request(request_id).await?;

        if request.lender_id != lender_id {
            return Err(AppError::Forbidden(
                "Only the lender can confirm a return".to_string(),
            ));
        }

        if request.status != BorrowStatus::AwaitingConfirmation {
            return Err(AppError::InvalidState(
                "This loan is not awaiting return confirmation".to_string(),
            ));
        }

        let borrower_id = request.borrower_id.clone();
        let item_id = request.item_id.clone();

        // Review runs before the transition, as in initiate_return.
        if let Some(review) = review {
            self.review_service
                .submit(
                    request_id,
                    lender_id,
                    &borrower_id,
                    review.rating,
                    review.comment,
                )
                .await?;
        }

        let mut active: borrow_request::ActiveModel = request.into();
        active.status = Set(BorrowStatus::Returned);
        active.return_date = Set(Some(chrono::Utc::now().into()));
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        let updated = self.borrow_repo.update(active).await?;

        let flipped = self
            .item_repo
            .set_availability(
                &item_id,
                AvailabilityStatus::Borrowed,
                AvailabilityStatus::Available,
            )
            .await?;
        if flipped == 0 {
            tracing::warn!(item_id = %item_id, "Item was not in borrowed state at return confirmation");
        }

        let item_name = self.item_name(&item_id).await?;
        self.notification_service
            .notify(
                &borrower_id,
                lender_id,
                NotificationEvent::ReturnConfirmed {
                    item_name: item_name.clone(),
                },
                &format!("confirmed the return of {item_name}"),
                "/requests",
            )
            .await?;

        Ok(updated)
    }

    /// All requests touching the user, split by direction.
    pub async fn get_requests(&self, user_id: &str) -> AppResult<BorrowRequestsView> {
        let incoming = self.borrow_repo.find_incoming(user_id).await?;
        let outgoing = self.borrow_repo.find_outgoing(user_id).await?;

        let mut user_ids: Vec<String> = incoming.iter().map(|r| r.borrower_id.clone()).collect();
        user_ids.extend(outgoing.iter().map(|r| r.lender_id.clone()));
        let mut item_ids: Vec<String> = incoming.iter().map(|r| r.item_id.clone()).collect();
        item_ids.extend(outgoing.iter().map(|r| r.item_id.clone()));

        let users = self.user_repo.find_by_ids(&user_ids).await?;
        let items = self.item_repo.find_by_ids(&item_ids).await?;

        let build = |requests: Vec<borrow_request::Model>, counterpart_of: fn(&borrow_request::Model) -> &str| {
            requests
                .into_iter()
                .map(|r| {
                    let counterpart = users
                        .iter()
                        .find(|u| u.id == counterpart_of(&r))
                        .map(UserSummary::from);
                    let item = items.iter().find(|i| i.id == r.item_id).map(ItemSummary::from);
                    BorrowRequestView {
                        request: r,
                        counterpart,
                        item,
                    }
                })
                .collect::<Vec<_>>()
        };

        Ok(BorrowRequestsView {
            incoming: build(incoming, |r| &r.borrower_id),
            outgoing: build(outgoing, |r| &r.lender_id),
        })
    }

    /// Fetch a single request. Only its parties may read it.
    pub async fn find_by_id(
        &self,
        request_id: &str,
        user_id: &str,
    ) -> AppResult<borrow_request::Model> {
        let request = self.find_request(request_id).await?;
        if request.borrower_id != user_id && request.lender_id != user_id {
            return Err(AppError::Forbidden(
                "You are not a party to this request".to_string(),
            ));
        }
        Ok(request)
    }

    async fn find_request(&self, request_id: &str) -> AppResult<borrow_request::Model> {
        self.borrow_repo
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("borrow request {request_id}")))
    }

    async fn item_name(&self, item_id: &str) -> AppResult<String> {
        Ok(self
            .item_repo
            .find_by_id(item_id)
            .await?
            .map(|i| i.name)
            .unwrap_or_else(|| "an item".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::notification::NotificationService;
    use lendlocal_db::entities::{
        item, notification, notification::NotificationType, user,
    };
    use lendlocal_db::repositories::{NotificationRepository, ReviewRepository};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> (BorrowService, Arc<DatabaseConnection>) {
        let db = Arc::new(db);
        let user_repo = UserRepository::new(Arc::clone(&db));
        let item_repo = ItemRepository::new(Arc::clone(&db));
        let borrow_repo = BorrowRequestRepository::new(Arc::clone(&db));
        let review_service = ReviewService::new(
            ReviewRepository::new(Arc::clone(&db)),
            borrow_repo.clone(),
            user_repo.clone(),
        );
        let notification_service = NotificationService::new(
            NotificationRepository::new(Arc::clone(&db)),
            user_repo.clone(),
            String::new(),
        );
        let svc = BorrowService::new(
            borrow_repo,
            item_repo,
            user_repo,
            review_service,
            notification_service,
        );
        (svc, db)
    }

    fn request(status: BorrowStatus) -> borrow_request::Model {
        borrow_request::Model {
            id: "r1".to_string(),
            item_id: "i1".to_string(),
            borrower_id: "b1".to_string(),
            lender_id: "l1".to_string(),
            status,
            request_date: chrono::Utc::now().into(),
            return_date: None,
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        }
    }

    fn sample_item(status: AvailabilityStatus) -> item::Model {
        item::Model {
            id: "i1".to_string(),
            owner_id: "l1".to_string(),
            community_id: "c1".to_string(),
            name: "ladder".to_string(),
            description: "a ladder".to_string(),
            category: "tools".to_string(),
            photos: serde_json::json!([]),
            availability_status: status,
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        }
    }

    fn sample_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: id.to_string(),
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

    fn sample_notification(notification_type: NotificationType) -> notification::Model {
        notification::Model {
            id: "n1".to_string(),
            recipient_id: "b1".to_string(),
            sender_id: "l1".to_string(),
            notification_type,
            message: "m".to_string(),
            link: "/requests".to_string(),
            item_name: Some("ladder".to_string()),
            is_read: false,
            created_at: chrono::Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_approval_flips_item_and_advances_status() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request(BorrowStatus::Pending)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![sample_item(AvailabilityStatus::Borrowed)]])
            .append_query_results([vec![request(BorrowStatus::Approved)]])
            .append_query_results([vec![sample_user("b1")], vec![sample_user("l1")]])
            .append_query_results([vec![sample_notification(NotificationType::RequestApproved)]])
            .into_connection();
        let (svc, _db) = service(db);

        let updated = svc
            .respond_to_request("r1", "l1", BorrowDecision::Approved)
            .await
            .unwrap();
        assert_eq!(updated.status, BorrowStatus::Approved);
    }

    #[tokio::test]
    async fn test_approval_loses_availability_race() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request(BorrowStatus::Pending)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let (svc, _db) = service(db);

        let result = svc
            .respond_to_request("r1", "l1", BorrowDecision::Approved)
            .await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_only_lender_can_respond() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request(BorrowStatus::Pending)]])
            .into_connection();
        let (svc, _db) = service(db);

        let result = svc
            .respond_to_request("r1", "b1", BorrowDecision::Approved)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_rejected_rating_leaves_request_untouched() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request(BorrowStatus::Approved)]])
            .into_connection();
        let (svc, db) = service(db);

        let result = svc
            .initiate_return(
                "r1",
                "b1",
                Some(ReviewInput {
                    rating: 9,
                    comment: None,
                }),
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        // Only the lookup ran; the status transition was never written.
        drop(svc);
        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_initiate_return_awaits_confirmation() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request(BorrowStatus::Approved)]])
            .append_query_results([vec![request(BorrowStatus::AwaitingConfirmation)]])
            .append_query_results([vec![sample_item(AvailabilityStatus::Borrowed)]])
            .append_query_results([vec![sample_user("l1")], vec![sample_user("b1")]])
            .append_query_results([vec![sample_notification(NotificationType::ItemReturned)]])
            .into_connection();
        let (svc, _db) = service(db);

        let updated = svc.initiate_return("r1", "b1", None).await.unwrap();
        assert_eq!(updated.status, BorrowStatus::AwaitingConfirmation);
    }

    #[tokio::test]
    async fn test_confirm_return_completes_the_loan() {
        let mut returned = request(BorrowStatus::Returned);
        returned.return_date = Some(chrono::Utc::now().into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request(BorrowStatus::AwaitingConfirmation)]])
            .append_query_results([vec![returned]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![sample_item(AvailabilityStatus::Available)]])
            .append_query_results([vec![sample_user("b1")], vec![sample_user("l1")]])
            .append_query_results([vec![sample_notification(NotificationType::ReturnConfirmed)]])
            .into_connection();
        let (svc, _db) = service(db);

        let updated = svc.confirm_return("r1", "l1", None).await.unwrap();
        assert_eq!(updated.status, BorrowStatus::Returned);
        assert!(updated.return_date.is_some());
    }

    #[tokio::test]
    async fn test_confirm_requires_awaiting_state() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request(BorrowStatus::Approved)]])
            .into_connection();
        let (svc, _db) = service(db);

        let result = svc.confirm_return("r1", "l1", None).await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }
}
