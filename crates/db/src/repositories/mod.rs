//! Repository layer.
//!
//! One repository per aggregate; each holds a shared database handle and maps
//! driver errors into `AppError::Database`.

pub mod borrow_request;
pub mod chat;
pub mod community;
pub mod follow;
pub mod item;
pub mod item_request;
pub mod notification;
pub mod report;
pub mod review;
pub mod user;

pub use borrow_request::BorrowRequestRepository;
pub use chat::ChatRepository;
pub use community::CommunityRepository;
pub use follow::FollowRepository;
pub use item::ItemRepository;
pub use item_request::ItemRequestRepository;
pub use notification::NotificationRepository;
pub use report::ReportRepository;
pub use review::ReviewRepository;
pub use user::UserRepository;
