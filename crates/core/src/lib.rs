//! Domain rules for the estate listing service.
//!
//! Everything in this crate is pure: no database, no network. The `db`,
//! `events`, `api` and `worker` crates call into it for state transitions,
//! pricing and validation.

pub mod access;
pub mod admin_actions;
pub mod analytics;
pub mod contact;
pub mod duplicates;
pub mod error;
pub mod fake_image;
pub mod hashing;
pub mod legal;
pub mod moderation;
pub mod naming;
pub mod payment;
pub mod premium;
pub mod promo;
pub mod property;
pub mod roles;
pub mod search;
pub mod sweep;
pub mod types;
