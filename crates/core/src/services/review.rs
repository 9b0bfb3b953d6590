//! Review and reputation service.

use crate::services::user::UserSummary;
use lendlocal_common::{AppError, AppResult, IdGenerator};
use lendlocal_db::{
    entities::{
        borrow_request::{self, BorrowStatus},
        review,
    },
    repositories::{BorrowRequestRepository, ReviewRepository, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;

/// A review paired with its reviewer summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: review::Model,
    pub reviewer: Option<UserSummary>,
}

/// Review service for business logic.
#[derive(Clone)]
pub struct ReviewService {
    review_repo: ReviewRepository,
    borrow_repo: BorrowRequestRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl ReviewService {
    /// Create a new review service.
    #[must_use]
    pub const fn new(
        review_repo: ReviewRepository,
        borrow_repo: BorrowRequestRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            review_repo,
            borrow_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Leave a review on a completed borrow request.
    ///
    /// The reviewer must be a party to the request and the request must have
    /// reached `returned`; the reviewee is always the opposite party.
    pub async fn create(
        &self,
        borrow_request_id: &str,
        reviewer_id: &str,
        rating: i16,
        comment: Option<String>,
    ) -> AppResult<review::Model> {
        let request = self
            .borrow_repo
            .find_by_id(borrow_request_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("borrow request {borrow_request_id}")))?;

        if request.status != BorrowStatus::Returned {
            return Err(AppError::InvalidState(
                "Reviews can only be left once the item has been returned".to_string(),
            ));
        }

        let reviewee_id = counterpart(&request, reviewer_id).ok_or_else(|| {
            AppError::Forbidden("Only the borrower or lender can leave a review".to_string())
        })?;

        self.submit(&request.id, reviewer_id, &reviewee_id, rating, comment)
            .await
    }

    /// Record a review and recompute the reviewee's reputation.
    ///
    /// Shared by the standalone endpoint and the return-flow embedded reviews,
    /// which run before the request reaches `returned`.
    pub(crate) async fn submit(
        &self,
        borrow_request_id: &str,
        reviewer_id: &str,
        reviewee_id: &str,
        rating: i16,
        comment: Option<String>,
    ) -> AppResult<review::Model> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        if self
            .review_repo
            .find_by_request_and_reviewer(borrow_request_id, reviewer_id)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest(
                "You have already reviewed this exchange".to_string(),
            ));
        }

        let model = review::ActiveModel {
            id: Set(self.id_gen.generate()),
            reviewer_id: Set(reviewer_id.to_string()),
            reviewee_id: Set(reviewee_id.to_string()),
            borrow_request_id: Set(borrow_request_id.to_string()),
            rating: Set(rating),
            comment: Set(comment),
            created_at: Set(chrono::Utc::now().into()),
        };

        let review = self.review_repo.create(model).await?;
        self.recompute_reputation(reviewee_id).await?;

        Ok(review)
    }

    /// Reviews received by a user, newest first, with reviewer summaries.
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<ReviewView>> {
        let reviews = self.review_repo.find_by_reviewee(user_id).await?;

        let reviewer_ids: Vec<String> = reviews.iter().map(|r| r.reviewer_id.clone()).collect();
        let reviewers = self.user_repo.find_by_ids(&reviewer_ids).await?;

        Ok(reviews
            .into_iter()
            .map(|r| {
                let reviewer = reviewers
                    .iter()
                    .find(|u| u.id == r.reviewer_id)
                    .map(UserSummary::from);
                ReviewView {
                    review: r,
                    reviewer,
                }
            })
            .collect())
    }

    /// Recompute a user's reputation as the mean of all received ratings.
    async fn recompute_reputation(&self, user_id: &str) -> AppResult<()> {
        let ratings = self.review_repo.ratings_for_user(user_id).await?;
        let score = reputation_score(&ratings);

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;

        let mut active: lendlocal_db::entities::user::ActiveModel = user.into();
        active.reputation_score = Set(score);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        self.user_repo.update(active).await?;

        Ok(())
    }
}

/// Mean of all received ratings; a user with no reviews holds the 5.0 default.
fn reputation_score(ratings: &[i16]) -> f64 {
    if ratings.is_empty() {
        return 5.0;
    }
    #[allow(clippy::cast_precision_loss)]
    {
        ratings.iter().map(|r| f64::from(*r)).sum::<f64>() / ratings.len() as f64
    }
}

/// The opposite party on a borrow request, if the given user is a party.
fn counterpart(request: &borrow_request::Model, user_id: &str) -> Option<String> {
    if request.borrower_id == user_id {
        Some(request.lender_id.clone())
    } else if request.lender_id == user_id {
        Some(request.borrower_id.clone())
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> ReviewService {
        let db = Arc::new(db);
        ReviewService::new(
            ReviewRepository::new(Arc::clone(&db)),
            BorrowRequestRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
        )
    }

    fn request(borrower: &str, lender: &str, status: BorrowStatus) -> borrow_request::Model {
        borrow_request::Model {
            id: "r1".into(),
            item_id: "i1".into(),
            borrower_id: borrower.into(),
            lender_id: lender.into(),
            status,
            request_date: chrono::Utc::now().into(),
            return_date: None,
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        }
    }

    fn sample_review() -> review::Model {
        review::Model {
            id: "v1".into(),
            reviewer_id: "alice".into(),
            reviewee_id: "bob".into(),
            borrow_request_id: "r1".into(),
            rating: 4,
            comment: None,
            created_at: chrono::Utc::now().into(),
        }
    }

    #[test]
    fn test_counterpart_resolution() {
        let r = request("alice", "bob", BorrowStatus::Returned);
        assert_eq!(counterpart(&r, "alice").as_deref(), Some("bob"));
        assert_eq!(counterpart(&r, "bob").as_deref(), Some("alice"));
        assert_eq!(counterpart(&r, "carol"), None);
    }

    #[test]
    fn test_reputation_is_mean_of_ratings() {
        assert!((reputation_score(&[]) - 5.0).abs() < f64::EPSILON);
        assert!((reputation_score(&[4, 5]) - 4.5).abs() < f64::EPSILON);
        assert!((reputation_score(&[1, 1, 5]) - 7.0 / 3.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_review_requires_returned_request() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request("alice", "bob", BorrowStatus::Approved)]])
            .into_connection();
        let svc = service(db);

        let result = svc.create("r1", "alice", 5, None).await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_double_review_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request("alice", "bob", BorrowStatus::Returned)]])
            .append_query_results([vec![sample_review()]])
            .into_connection();
        let svc = service(db);

        let result = svc.create("r1", "alice", 5, None).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_outsider_cannot_review() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![request("alice", "bob", BorrowStatus::Returned)]])
            .into_connection();
        let svc = service(db);

        let result = svc.create("r1", "carol", 5, None).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
