//! Request guards.
//!
//! - [`auth::AuthUser`] -- authenticated user from a Bearer token.
//! - [`auth::MaybeAuthUser`] -- same, but anonymous requests pass through.
//! - [`rbac::RequireAdmin`] / [`rbac::RequireBroker`] -- role gates.
//! - [`admin_ip::restrict_admin_ip`] -- IP allow-list in front of `/admin`.

pub mod admin_ip;
pub mod auth;
pub mod rbac;
