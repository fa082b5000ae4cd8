//! Application state
//!
//! Holds the shared state for the Axum application: the service context,
//! the configuration, and the database pool when PostgreSQL backs the store.

use std::sync::Arc;

use feed_common::AppConfig;
use feed_db::PgPool;
use feed_service::ServiceContext;
use tracing::info;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    config: Arc<AppConfig>,
    db_pool: Option<PgPool>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service_context: ServiceContext, config: AppConfig) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
            db_pool: None,
        }
    }

    /// Keep the pool so shutdown can close it
    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Stop background work, land pending deltas, and close the pool
    pub async fn shutdown(&self) {
        self.service_context.shutdown().await;
        if let Some(pool) = &self.db_pool {
            pool.close().await;
        }
        info!("Application state shut down");
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("config", &"AppConfig")
            .field("db_pool", &self.db_pool.is_some())
            .finish()
    }
}
