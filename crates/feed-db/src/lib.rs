//! # feed-db
//!
//! Message store implementations of `feed_core::MessageRepository`.
//!
//! - PostgreSQL via SQLx: connection pool, migrations, `FromRow` models,
//!   entity mappers, and `PgMessageRepository`
//! - `MemoryMessageRepository` for development and tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use feed_db::{create_pool, run_migrations, PgMessageRepository, PoolConfig};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PoolConfig::new("postgres://localhost/feed");
//!     let pool = create_pool(&config).await?;
//!     run_migrations(&pool, &config.migrations_dir).await?;
//!     let repo = PgMessageRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, PgPool, PoolConfig};
pub use repositories::{MemoryMessageRepository, PgMessageRepository};
