use std::sync::Arc;

use bangazon_core::anti_forgery::AntiForgeryKey;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool. Handlers open their own transactions from it.
    pub pool: bangazon_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Signs and verifies anti-forgery tokens for form posts.
    pub anti_forgery: Arc<AntiForgeryKey>,
}

impl AppState {
    pub fn new(pool: bangazon_db::DbPool, config: ServerConfig) -> Self {
        let anti_forgery = Arc::new(config.anti_forgery.key());
        Self {
            pool,
            config: Arc::new(config),
            anti_forgery,
        }
    }
}
