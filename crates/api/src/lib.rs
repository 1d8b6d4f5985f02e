//! HTTP layer of the estate listing service.
//!
//! Exposes config, state, error handling and the router builder so the
//! binary and the integration tests share them.

pub mod activity;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod pages;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
