use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference-counted and the config is behind
/// an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: yogahub_db::DbPool,
    /// Server configuration (JWT secret for the auth extractor, CORS, timeouts).
    pub config: Arc<ServerConfig>,
}
