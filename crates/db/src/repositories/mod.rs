//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or an open transaction) as the first argument.

pub mod category_repo;
pub mod chat_repo;
pub mod executor_detail_repo;
pub mod feedback_repo;
pub mod geo_repo;
pub mod notification_repo;
pub mod order_repo;
pub mod otp_repo;
pub mod profile_repo;
pub mod session_repo;
pub mod transaction_repo;
pub mod user_repo;
pub mod verification_repo;

pub use category_repo::{CategoryRepo, SubcategoryRepo};
pub use chat_repo::{ChatFileRepo, ChatRepo, MessageRepo, ParticipantRepo};
pub use executor_detail_repo::{
    AddressRepo, ExperienceFileRepo, ExperienceRepo, PortfolioRepo, ServiceRepo, WorkAreaRepo,
};
pub use feedback_repo::FeedbackRepo;
pub use geo_repo::GeoRepo;
pub use notification_repo::NotificationRepo;
pub use order_repo::OrderRepo;
pub use otp_repo::OtpRepo;
pub use profile_repo::ProfileRepo;
pub use session_repo::SessionRepo;
pub use transaction_repo::{SubscriptionPlanRepo, TransactionRepo};
pub use user_repo::UserRepo;
pub use verification_repo::VerificationRepo;
