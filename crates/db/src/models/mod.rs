//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod analytics;
pub mod blog;
pub mod contact;
pub mod dashboard;
pub mod image;
pub mod legal;
pub mod notification;
pub mod premium;
pub mod promo_code;
pub mod property;
pub mod saved_search;
pub mod session;
pub mod user;
