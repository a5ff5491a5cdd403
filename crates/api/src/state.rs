use std::sync::Arc;

use huduma_lifecycle::LifecycleService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool and service are handles, the config is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: huduma_db::DbPool,
    /// Server configuration (JWT secret is read by the auth extractor).
    pub config: Arc<ServerConfig>,
    /// Request/bid/booking lifecycle facade.
    pub lifecycle: LifecycleService,
}
