//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod analytics_repo;
pub mod blog_repo;
pub mod contact_repo;
pub mod dashboard_repo;
pub mod image_repo;
pub mod legal_repo;
pub mod notification_repo;
pub mod premium_repo;
pub mod promo_code_repo;
pub mod property_repo;
pub mod saved_search_repo;
pub mod session_repo;
pub mod user_repo;

pub use analytics_repo::{PageViewRepo, SocialShareRepo, UserActivityRepo};
pub use blog_repo::BlogPostRepo;
pub use contact_repo::ContactInquiryRepo;
pub use dashboard_repo::DashboardRepo;
pub use image_repo::ImageRepo;
pub use legal_repo::LegalPageRepo;
pub use notification_repo::EmailNotificationRepo;
pub use premium_repo::PremiumListingRepo;
pub use promo_code_repo::PromoCodeRepo;
pub use property_repo::PropertyRepo;
pub use saved_search_repo::SavedSearchRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
