//! Database entities.

pub mod borrow_request;
pub mod community;
pub mod community_member;
pub mod conversation;
pub mod follow;
pub mod item;
pub mod item_offer;
pub mod item_request;
pub mod join_request;
pub mod message;
pub mod notification;
pub mod report;
pub mod review;
pub mod user;

pub use borrow_request::Entity as BorrowRequest;
pub use community::Entity as Community;
pub use community_member::Entity as CommunityMember;
pub use conversation::Entity as Conversation;
pub use follow::Entity as Follow;
pub use item::Entity as Item;
pub use item_offer::Entity as ItemOffer;
pub use item_request::Entity as ItemRequest;
pub use join_request::Entity as JoinRequest;
pub use message::Entity as Message;
pub use notification::Entity as Notification;
pub use report::Entity as Report;
pub use review::Entity as Review;
pub use user::Entity as User;
