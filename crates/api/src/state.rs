use std::sync::Arc;

use estate_core::payment::SimulatedGateway;
use estate_events::Notifier;

use crate::config::ServerConfig;
use crate::pages::PageRenderer;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything but the pool is behind an `Arc`, and the pool
/// is itself reference counted.
#[derive(Clone)]
pub struct AppState {
    pub pool: estate_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Payment simulator; its RNG is mutex-guarded inside.
    pub gateway: Arc<SimulatedGateway>,
    /// Renders, sends and reports notification emails.
    pub notifier: Arc<Notifier>,
    /// Server-rendered HTML pages.
    pub pages: Arc<PageRenderer>,
}
