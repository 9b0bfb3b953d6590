//! Community service.

use crate::services::notification::{NotificationEvent, NotificationService};
use crate::services::user::UserSummary;
use lendlocal_common::{AppError, AppResult, IdGenerator};
use lendlocal_db::{
    entities::{
        community, community_member,
        join_request::{self, JoinRequestStatus},
    },
    repositories::{CommunityRepository, UserRepository},
};
use rand::Rng;
use sea_orm::Set;
use serde::Serialize;

/// Invite codes avoid ambiguous characters (0/O, 1/I/L).
const INVITE_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const INVITE_CODE_LEN: usize = 6;

/// A community with membership context for the requesting user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityView {
    #[serde(flatten)]
    pub community: community::Model,
    pub member_count: u64,
    pub is_member: bool,
    pub has_pending_request: bool,
}

/// Community detail including the member roster.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityDetailView {
    #[serde(flatten)]
    pub view: CommunityView,
    pub members: Vec<UserSummary>,
}

/// A join request with the applicant's summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequestView {
    #[serde(flatten)]
    pub request: join_request::Model,
    pub user: Option<UserSummary>,
}

/// Community service for business logic.
#[derive(Clone)]
pub struct CommunityService {
    community_repo: CommunityRepository,
    user_repo: UserRepository,
    notification_service: NotificationService,
    id_gen: IdGenerator,
}

impl CommunityService {
    /// Create a new community service.
    #[must_use]
    pub const fn new(
        community_repo: CommunityRepository,
        user_repo: UserRepository,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            community_repo,
            user_repo,
            notification_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a community. The owner becomes its first member.
    pub async fn create(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
    ) -> AppResult<community::Model> {
        let invite_code = self.generate_unique_invite_code().await?;
        let now = chrono::Utc::now();

        let community = self
            .community_repo
            .create(community::ActiveModel {
                id: Set(self.id_gen.generate()),
                owner_id: Set(owner_id.to_string()),
                name: Set(name.to_string()),
                description: Set(description.to_string()),
                invite_code: Set(invite_code),
                created_at: Set(now.into()),
                updated_at: Set(None),
            })
            .await?;

        self.community_repo
            .add_member(community_member::ActiveModel {
                id: Set(self.id_gen.generate()),
                community_id: Set(community.id.clone()),
                user_id: Set(owner_id.to_string()),
                joined_at: Set(now.into()),
            })
            .await?;

        Ok(community)
    }

    /// Join a community directly via its invite code. Idempotent for existing
    /// members.
    pub async fn join_by_code(&self, invite_code: &str, user_id: &str) -> AppResult<community::Model> {
        let community = self
            .community_repo
            .find_by_invite_code(invite_code)
            .await?
            .ok_or_else(|| AppError::NotFound("No community with that invite code".to_string()))?;

        if !self.community_repo.is_member(&community.id, user_id).await? {
            self.community_repo
                .add_member(community_member::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    community_id: Set(community.id.clone()),
                    user_id: Set(user_id.to_string()),
                    joined_at: Set(chrono::Utc::now().into()),
                })
                .await?;
        }

        Ok(community)
    }

    /// Community detail with roster and the caller's membership context.
    pub async fn get(&self, community_id: &str, user_id: &str) -> AppResult<CommunityDetailView> {
        let community = self.find_community(community_id).await?;
        let view = self.build_view(community, user_id).await?;

        let members = self.community_repo.find_members(community_id).await?;
        let member_ids: Vec<String> = members.into_iter().map(|m| m.user_id).collect();
        let users = self.user_repo.find_by_ids(&member_ids).await?;
        let members = users.iter().map(UserSummary::from).collect();

        Ok(CommunityDetailView { view, members })
    }

    /// All communities with membership context for the caller.
    pub async fn list(&self, user_id: &str) -> AppResult<Vec<CommunityView>> {
        let communities = self.community_repo.find_all().await?;
        let mut views = Vec::with_capacity(communities.len());
        for community in communities {
            views.push(self.build_view(community, user_id).await?);
        }
        Ok(views)
    }

    /// Communities the caller belongs to.
    pub async fn list_mine(&self, user_id: &str) -> AppResult<Vec<CommunityView>> {
        let communities = self.community_repo.find_by_member(user_id).await?;
        let mut views = Vec::with_capacity(communities.len());
        for community in communities {
            views.push(self.build_view(community, user_id).await?);
        }
        Ok(views)
    }

    /// Reveal the invite code. Members only.
    pub async fn invite_code(&self, community_id: &str, user_id: &str) -> AppResult<String> {
        let community = self.find_community(community_id).await?;
        if !self.community_repo.is_member(community_id, user_id).await? {
            return Err(AppError::Forbidden(
                "Only members can see the invite code".to_string(),
            ));
        }
        Ok(community.invite_code)
    }

    /// Ask to join a community; the owner is notified.
    pub async fn request_to_join(
        &self,
        community_id: &str,
        user_id: &str,
    ) -> AppResult<join_request::Model> {
        let community = self.find_community(community_id).await?;

        if self.community_repo.is_member(community_id, user_id).await? {
            return Err(AppError::BadRequest(
                "You are already a member of this community".to_string(),
            ));
        }

        if self
            .community_repo
            .find_pending_join_request(community_id, user_id)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest(
                "You already have a pending request for this community".to_string(),
            ));
        }

        let request = self
            .community_repo
            .create_join_request(join_request::ActiveModel {
                id: Set(self.id_gen.generate()),
                community_id: Set(community_id.to_string()),
                user_id: Set(user_id.to_string()),
                status: Set(JoinRequestStatus::Pending),
                created_at: Set(chrono::Utc::now().into()),
                updated_at: Set(None),
            })
            .await?;

        self.notification_service
            .notify(
                &community.owner_id,
                user_id,
                NotificationEvent::NewJoinRequest {
                    community_name: community.name.clone(),
                },
                &format!("requested to join {}", community.name),
                &format!("/communities/{community_id}"),
            )
            .await?;

        Ok(request)
    }

    /// Pending join requests. Owner only.
    pub async fn list_join_requests(
        &self,
        community_id: &str,
        owner_id: &str,
    ) -> AppResult<Vec<JoinRequestView>> {
        let community = self.find_community(community_id).await?;
        if community.owner_id != owner_id {
            return Err(AppError::Forbidden(
                "Only the owner can view join requests".to_string(),
            ));
        }

        let requests = self
            .community_repo
            .find_pending_join_requests(community_id)
            .await?;

        let user_ids: Vec<String> = requests.iter().map(|r| r.user_id.clone()).collect();
        let users = self.user_repo.find_by_ids(&user_ids).await?;

        Ok(requests
            .into_iter()
            .map(|r| {
                let user = users.iter().find(|u| u.id == r.user_id).map(UserSummary::from);
                JoinRequestView { request: r, user }
            })
            .collect())
    }

    /// Resolve a pending join request. Owner only; approval adds membership.
    pub async fn respond_to_join_request(
        &self,
        join_request_id: &str,
        owner_id: &str,
        approve: bool,
    ) -> AppResult<join_request::Model> {
        let request = self
            .community_repo
            .find_join_request_by_id(join_request_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("join request {join_request_id}")))?;

        let community = self.find_community(&request.community_id).await?;
        if community.owner_id != owner_id {
            return Err(AppError::Forbidden(
                "Only the owner can respond to join requests".to_string(),
            ));
        }

        if request.status != JoinRequestStatus::Pending {
            return Err(AppError::InvalidState(
                "This join request has already been resolved".to_string(),
            ));
        }

        if approve {
            self.community_repo
                .add_member(community_member::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    community_id: Set(request.community_id.clone()),
                    user_id: Set(request.user_id.clone()),
                    joined_at: Set(chrono::Utc::now().into()),
                })
                .await?;
        }

        let mut active: join_request::ActiveModel = request.into();
        active.status = Set(if approve {
            JoinRequestStatus::Approved
        } else {
            JoinRequestStatus::Rejected
        });
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.community_repo.update_join_request(active).await
    }

    /// Update name/description. Owner only.
    pub async fn update(
        &self,
        community_id: &str,
        owner_id: &str,
        name: Option<String>,
        description: Option<String>,
    ) -> AppResult<community::Model> {
        let community = self.find_community(community_id).await?;
        if community.owner_id != owner_id {
            return Err(AppError::Forbidden(
                "Only the owner can update a community".to_string(),
            ));
        }

        let mut active: community::ActiveModel = community.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(description) = description {
            active.description = Set(description);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.community_repo.update(active).await
    }

    async fn find_community(&self, community_id: &str) -> AppResult<community::Model> {
        self.community_repo
            .find_by_id(community_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("community {community_id}")))
    }

    async fn build_view(
        &self,
        community: community::Model,
        user_id: &str,
    ) -> AppResult<CommunityView> {
        let member_count = self.community_repo.count_members(&community.id).await?;
        let is_member = self.community_repo.is_member(&community.id, user_id).await?;
        let has_pending_request = !is_member
            && self
                .community_repo
                .find_pending_join_request(&community.id, user_id)
                .await?
                .is_some();

        Ok(CommunityView {
            community,
            member_count,
            is_member,
            has_pending_request,
        })
    }

    /// Generate an invite code not already in use.
    async fn generate_unique_invite_code(&self) -> AppResult<String> {
        // Collisions are vanishingly rare at this alphabet size; the retry cap
        // keeps a pathological database state from looping forever.
        for _ in 0..10 {
            let code = generate_invite_code();
            if self
                .community_repo
                .find_by_invite_code(&code)
                .await?
                .is_none()
            {
                return Ok(code);
            }
        }
        Err(AppError::Internal(
            "Could not generate a unique invite code".to_string(),
        ))
    }
}

fn generate_invite_code() -> String {
    let mut rng = rand::thread_rng();
    (0..INVITE_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..INVITE_CODE_ALPHABET.len());
            INVITE_CODE_ALPHABET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_code_shape() {
        for _ in 0..100 {
            let code = generate_invite_code();
            assert_eq!(code.len(), INVITE_CODE_LEN);
            assert!(
                code.bytes().all(|b| INVITE_CODE_ALPHABET.contains(&b)),
                "unexpected character in {code}"
            );
        }
    }

    #[test]
    fn test_alphabet_has_no_ambiguous_characters() {
        for banned in [b'0', b'O', b'1', b'I', b'L'] {
            assert!(
                !INVITE_CODE_ALPHABET.contains(&banned),
                "ambiguous character {} in alphabet",
                banned as char
            );
        }
    }
}
