//! Business logic services.

pub mod borrow;
pub mod chat;
pub mod community;
pub mod email;
pub mod event_publisher;
pub mod follow;
pub mod item;
pub mod item_request;
pub mod notification;
pub mod presence;
pub mod report;
pub mod review;
pub mod user;

pub use borrow::{BorrowDecision, BorrowRequestsView, BorrowService, ReviewInput};
pub use chat::{ChatService, ConversationView};
pub use community::{CommunityDetailView, CommunityService, CommunityView, JoinRequestView};
pub use email::EmailService;
pub use event_publisher::{EventPublisher, EventPublisherService, NoOpEventPublisher, StreamEvent};
pub use follow::FollowService;
pub use item::{ItemService, ItemSummary};
pub use item_request::{ItemRequestService, ItemRequestView};
pub use notification::{NotificationEvent, NotificationService, NotificationView};
pub use presence::PresenceRegistry;
pub use report::ReportService;
pub use review::{ReviewService, ReviewView};
pub use user::{UserService, UserSummary};
