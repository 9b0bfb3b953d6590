//! Item request ("wanted" post) service.

use crate::services::notification::{NotificationEvent, NotificationService};
use crate::services::user::UserSummary;
use lendlocal_common::{AppError, AppResult, IdGenerator};
use lendlocal_db::{
    entities::{
        borrow_request::{self, BorrowStatus},
        item::{self, AvailabilityStatus},
        item_offer,
        item_request::{self, ItemRequestStatus},
    },
    repositories::{
        BorrowRequestRepository, CommunityRepository, ItemRepository, ItemRequestRepository,
        UserRepository,
    },
};
use sea_orm::Set;
use serde::Serialize;

/// An item request with requester summary and offers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequestView {
    #[serde(flatten)]
    pub request: item_request::Model,
    pub requester: Option<UserSummary>,
    pub offers: Vec<ItemOfferView>,
}

/// An offer with its offeror summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOfferView {
    #[serde(flatten)]
    pub offer: item_offer::Model,
    pub offered_by: Option<UserSummary>,
}

/// Item request service for business logic.
#[derive(Clone)]
pub struct ItemRequestService {
    item_request_repo: ItemRequestRepository,
    item_repo: ItemRepository,
    borrow_repo: BorrowRequestRepository,
    community_repo: CommunityRepository,
    user_repo: UserRepository,
    notification_service: NotificationService,
    id_gen: IdGenerator,
}

impl ItemRequestService {
    /// Create a new item request service.
    #[must_use]
    pub const fn new(
        item_request_repo: ItemRequestRepository,
        item_repo: ItemRepository,
        borrow_repo: BorrowRequestRepository,
        community_repo: CommunityRepository,
        user_repo: UserRepository,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            item_request_repo,
            item_repo,
            borrow_repo,
            community_repo,
            user_repo,
            notification_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Post a wanted item to a community and notify the other members.
    pub async fn create(
        &self,
        requester_id: &str,
        community_id: &str,
        title: &str,
        description: &str,
    ) -> AppResult<item_request::Model> {
        if !self
            .community_repo
            .is_member(community_id, requester_id)
            .await?
        {
            return Err(AppError::Forbidden(
                "Only community members can post item requests".to_string(),
            ));
        }

        let model = item_request::ActiveModel {
            id: Set(self.id_gen.generate()),
            requester_id: Set(requester_id.to_string()),
            community_id: Set(community_id.to_string()),
            title: Set(title.to_string()),
            description: Set(description.to_string()),
            status: Set(ItemRequestStatus::Open),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let request = self.item_request_repo.create(model).await?;

        // Fan out to every other member; a single failed member notification
        // does not abort the rest.
        let members = self.community_repo.find_members(community_id).await?;
        for member in members {
            if member.user_id == requester_id {
                continue;
            }
            if let Err(e) = self
                .notification_service
                .notify(
                    &member.user_id,
                    requester_id,
                    NotificationEvent::NewItemRequest {
                        request_title: title.to_string(),
                    },
                    &format!("is looking for \"{title}\""),
                    &format!("/communities/{community_id}/requests"),
                )
                .await
            {
                tracing::warn!(error = %e, member = %member.user_id, "Failed to notify member of new item request");
            }
        }

        Ok(request)
    }

    /// Open requests in a community, newest first, with offers.
    pub async fn list_open(&self, community_id: &str) -> AppResult<Vec<ItemRequestView>> {
        let requests = self
            .item_request_repo
            .find_open_by_community(community_id)
            .await?;

        let mut views = Vec::with_capacity(requests.len());
        for request in requests {
            views.push(self.build_view(request).await?);
        }
        Ok(views)
    }

    /// Offer an item on an open request.
    pub async fn add_offer(
        &self,
        item_request_id: &str,
        offered_by_id: &str,
        message: Option<String>,
    ) -> AppResult<item_offer::Model> {
        let request = self.find_request(item_request_id).await?;

        if request.status != ItemRequestStatus::Open {
            return Err(AppError::InvalidState(
                "This request is no longer open".to_string(),
            ));
        }

        if request.requester_id == offered_by_id {
            return Err(AppError::BadRequest(
                "You cannot offer on your own request".to_string(),
            ));
        }

        let model = item_offer::ActiveModel {
            id: Set(self.id_gen.generate()),
            item_request_id: Set(item_request_id.to_string()),
            offered_by_id: Set(offered_by_id.to_string()),
            message: Set(message),
            created_at: Set(chrono::Utc::now().into()),
        };

        let offer = self.item_request_repo.create_offer(model).await?;

        self.notification_service
            .notify(
                &request.requester_id,
                offered_by_id,
                NotificationEvent::NewOffer {
                    request_title: request.title.clone(),
                },
                &format!("offered an item for \"{}\"", request.title),
                &format!("/communities/{}/requests", request.community_id),
            )
            .await?;

        Ok(offer)
    }

    /// Accept an offer: materialize a placeholder item and an approved loan,
    /// and close the request as fulfilled.
    pub async fn accept_offer(
        &self,
        item_request_id: &str,
        offer_id: &str,
        requester_id: &str,
    ) -> AppResult<borrow_request::Model> {
        let request = self.find_request(item_request_id).await?;

        if request.requester_id != requester_id {
            return Err(AppError::Forbidden(
                "Only the requester can accept an offer".to_string(),
            ));
        }

        if request.status != ItemRequestStatus::Open {
            return Err(AppError::InvalidState(
                "This request is no longer open".to_string(),
            ));
        }

        let offer = self
            .item_request_repo
            .find_offer_by_id(offer_id)
            .await?
            .filter(|o| o.item_request_id == item_request_id)
            .ok_or_else(|| AppError::NotFound(format!("offer {offer_id}")))?;

        let now = chrono::Utc::now();

        // The offered item has no listing of its own, so record a placeholder
        // owned by the offeror, already out on loan.
        let item = self
            .item_repo
            .create(item::ActiveModel {
                id: Set(self.id_gen.generate()),
                owner_id: Set(offer.offered_by_id.clone()),
                community_id: Set(request.community_id.clone()),
                name: Set(request.title.clone()),
                description: Set(request.description.clone()),
                category: Set("offered".to_string()),
                photos: Set(serde_json::json!([])),
                availability_status: Set(AvailabilityStatus::Borrowed),
                created_at: Set(now.into()),
                updated_at: Set(None),
            })
            .await?;

        let borrow = self
            .borrow_repo
            .create(borrow_request::ActiveModel {
                id: Set(self.id_gen.generate()),
                item_id: Set(item.id.clone()),
                borrower_id: Set(requester_id.to_string()),
                lender_id: Set(offer.offered_by_id.clone()),
                status: Set(BorrowStatus::Approved),
                request_date: Set(now.into()),
                return_date: Set(None),
                created_at: Set(now.into()),
                updated_at: Set(None),
            })
            .await?;

        let mut active: item_request::ActiveModel = request.clone().into();
        active.status = Set(ItemRequestStatus::Fulfilled);
        active.updated_at = Set(Some(now.into()));
        self.item_request_repo.update(active).await?;

        self.notification_service
            .notify(
                &offer.offered_by_id,
                requester_id,
                NotificationEvent::OfferAccepted {
                    request_title: request.title.clone(),
                },
                &format!("accepted your offer on \"{}\"", request.title),
                "/requests",
            )
            .await?;

        Ok(borrow)
    }

    async fn find_request(&self, item_request_id: &str) -> AppResult<item_request::Model> {
        self.item_request_repo
            .find_by_id(item_request_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("item request {item_request_id}")))
    }

    async fn build_view(&self, request: item_request::Model) -> AppResult<ItemRequestView> {
        let offers = self.item_request_repo.find_offers(&request.id).await?;

        let mut user_ids: Vec<String> = offers.iter().map(|o| o.offered_by_id.clone()).collect();
        user_ids.push(request.requester_id.clone());
        let users = self.user_repo.find_by_ids(&user_ids).await?;

        let requester = users
            .iter()
            .find(|u| u.id == request.requester_id)
            .map(UserSummary::from);

        let offers = offers
            .into_iter()
            .map(|o| {
                let offered_by = users
                    .iter()
                    .find(|u| u.id == o.offered_by_id)
                    .map(UserSummary::from);
                ItemOfferView {
                    offer: o,
                    offered_by,
                }
            })
            .collect();

        Ok(ItemRequestView {
            request,
            requester,
            offers,
        })
    }
}
