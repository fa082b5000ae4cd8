//! Server setup and initialization
//!
//! Picks the store and viewer-storage backends from configuration, builds the
//! router, and runs it until Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Router};
use feed_cache::{create_shared_pool, MemoryViewerStorage, RedisPoolConfig, RedisViewerStorage};
use feed_common::{AppConfig, AppError, StoreBackend, ViewerStoreBackend};
use feed_core::{MessageRepository, ViewerStorage};
use feed_db::{
    create_pool, run_migrations, MemoryMessageRepository, PgMessageRepository, PgPool, PoolConfig,
};
use feed_service::{LocalMediaIngestor, ServiceContextBuilder};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Room for multipart framing and the JSON part on top of the file itself
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let config = state.config();
    let body_limit = config.storage.max_file_size_bytes() + BODY_OVERHEAD_BYTES;

    let router = create_router()
        .nest_service("/media", ServeDir::new(&config.storage.upload_dir))
        .layer(DefaultBodyLimit::max(body_limit));
    let router = apply_middleware(router, &config.cors, config.app.env.is_production());
    router.with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let (message_repo, db_pool) = create_message_store(&config).await?;
    let viewer_storage = create_viewer_storage(&config)?;
    let media_ingestor = Arc::new(LocalMediaIngestor::from_config(&config.storage));
    info!(dir = %media_ingestor.dir().display(), "Media directory configured");

    let service_context = ServiceContextBuilder::new()
        .message_repo(message_repo)
        .viewer_storage(viewer_storage)
        .media_ingestor(media_ingestor)
        .feed_config(&config.feed)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let state = AppState::new(service_context, config);
    Ok(match db_pool {
        Some(pool) => state.with_db_pool(pool),
        None => state,
    })
}

async fn create_message_store(
    config: &AppConfig,
) -> Result<(Arc<dyn MessageRepository>, Option<PgPool>), AppError> {
    match (config.store, &config.database) {
        (StoreBackend::Postgres, Some(database)) => {
            info!("Connecting to PostgreSQL...");
            let pool_config = PoolConfig::from(database);
            let pool = create_pool(&pool_config)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            run_migrations(&pool, &pool_config.migrations_dir)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            info!("PostgreSQL connection established");

            let repo = Arc::new(PgMessageRepository::new(pool.clone()));
            Ok((repo, Some(pool)))
        }
        (StoreBackend::Postgres, None) => Err(AppError::Config(
            "DATABASE_URL is required for the postgres store".to_string(),
        )),
        (StoreBackend::Memory, _) => {
            warn!("Using the in-memory message store; messages are lost on restart");
            Ok((Arc::new(MemoryMessageRepository::new()), None))
        }
    }
}

fn create_viewer_storage(config: &AppConfig) -> Result<Arc<dyn ViewerStorage>, AppError> {
    match (config.viewer_store, &config.redis) {
        (ViewerStoreBackend::Redis, Some(redis)) => {
            info!("Connecting to Redis...");
            let pool = create_shared_pool(RedisPoolConfig::from(redis))
                .map_err(|e| AppError::Cache(e.to_string()))?;
            info!("Redis pool created");
            Ok(Arc::new(RedisViewerStorage::new(pool)))
        }
        (ViewerStoreBackend::Redis, None) => Err(AppError::Config(
            "REDIS_URL is required for the redis viewer store".to_string(),
        )),
        (ViewerStoreBackend::Memory, _) => {
            warn!("Using in-memory viewer storage; viewer state is lost on restart");
            Ok(Arc::new(MemoryViewerStorage::new()))
        }
    }
}

/// Run the HTTP server until Ctrl-C
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid bind address: {}", e)))?;

    let state = create_app_state(config).await?;
    let app = create_app(state.clone());

    let result = run_server(app, addr).await;
    state.shutdown().await;
    result
}
