//! Application configuration structs
//!
//! Loads configuration from environment variables (and `.env` via dotenvy).

use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub store: StoreBackend,
    pub database: Option<DatabaseConfig>,
    pub viewer_store: ViewerStoreBackend,
    pub redis: Option<RedisConfig>,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub feed: FeedConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" | "dev" => Ok(Self::Development),
            other => Err(other.to_string()),
        }
    }
}

/// Which message store backs the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(other.to_string()),
        }
    }
}

/// Which key/value store holds viewer-local state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewerStoreBackend {
    #[default]
    Redis,
    Memory,
}

impl std::str::FromStr for ViewerStoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(other.to_string()),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Directory of `*.sql` migrations, resolved against the working directory
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: String,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Media storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: u32,
    #[serde(default = "default_media_base_url")]
    pub media_base_url: String,
}

impl StorageConfig {
    #[must_use]
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb as usize * 1024 * 1024
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_file_size_mb: default_max_file_size(),
            media_base_url: default_media_base_url(),
        }
    }
}

/// Feed polling and counter delta delivery
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_delta_max_attempts")]
    pub delta_max_attempts: u32,
    #[serde(default = "default_delta_retry_base_ms")]
    pub delta_retry_base_ms: u64,
}

impl FeedConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn retry_base(&self) -> Duration {
        Duration::from_millis(self.delta_retry_base_ms)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            delta_max_attempts: default_delta_max_attempts(),
            delta_retry_base_ms: default_delta_retry_base_ms(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "feed-server".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_migrations_dir() -> String {
    "crates/feed-db/migrations".to_string()
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_upload_dir() -> String {
    "./uploads".to_string()
}

fn default_max_file_size() -> u32 {
    10
}

fn default_media_base_url() -> String {
    "/media".to_string()
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_delta_max_attempts() -> u32 {
    3
}

fn default_delta_retry_base_ms() -> u64 {
    200
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store: StoreBackend = parse_choice(&get, "STORE_BACKEND")?.unwrap_or_default();
        let viewer_store: ViewerStoreBackend =
            parse_choice(&get, "VIEWER_STORE_BACKEND")?.unwrap_or_default();

        let database = match store {
            StoreBackend::Postgres => Some(DatabaseConfig {
                url: get("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: parse_number(&get, "DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: parse_number(&get, "DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
                migrations_dir: get("DATABASE_MIGRATIONS_DIR")
                    .filter(|dir| !dir.trim().is_empty())
                    .unwrap_or_else(default_migrations_dir),
            }),
            StoreBackend::Memory => None,
        };

        let redis = match viewer_store {
            ViewerStoreBackend::Redis => Some(RedisConfig {
                url: get("REDIS_URL").ok_or(ConfigError::MissingVar("REDIS_URL"))?,
                max_connections: parse_number(&get, "REDIS_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_redis_max_connections),
            }),
            ViewerStoreBackend::Memory => None,
        };

        Ok(Self {
            app: AppSettings {
                name: get("APP_NAME").unwrap_or_else(default_app_name),
                env: parse_choice(&get, "APP_ENV")?.unwrap_or_default(),
            },
            api: ServerConfig {
                host: get("API_HOST").unwrap_or_else(default_host),
                port: parse_number(&get, "API_PORT")?
                    .ok_or(ConfigError::MissingVar("API_PORT"))?,
            },
            store,
            database,
            viewer_store,
            redis,
            cors: CorsConfig {
                allowed_origins: get("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            storage: StorageConfig {
                upload_dir: get("UPLOAD_DIR").unwrap_or_else(default_upload_dir),
                max_file_size_mb: parse_number(&get, "MAX_FILE_SIZE_MB")?
                    .unwrap_or_else(default_max_file_size),
                media_base_url: get("MEDIA_BASE_URL")
                    .map(|s| s.trim_end_matches('/').to_string())
                    .unwrap_or_else(default_media_base_url),
            },
            feed: FeedConfig {
                poll_interval_ms: parse_number(&get, "FEED_POLL_INTERVAL_MS")?
                    .filter(|ms| *ms > 0)
                    .unwrap_or_else(default_poll_interval_ms),
                delta_max_attempts: parse_number(&get, "DELTA_MAX_ATTEMPTS")?
                    .filter(|n| *n > 0)
                    .unwrap_or_else(default_delta_max_attempts),
                delta_retry_base_ms: parse_number(&get, "DELTA_RETRY_BASE_MS")?
                    .unwrap_or_else(default_delta_retry_base_ms),
            },
        })
    }
}

fn parse_choice<T, F>(get: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr<Err = String>,
    F: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| raw.parse::<T>().map_err(|v| ConfigError::InvalidValue(key, v)))
        .transpose()
}

/// Unsigned integer setting. Values that do not fit the target type are
/// rejected, not truncated.
fn parse_number<T, F>(get: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
    F: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidValue(key, format!("{raw:?}: {e}")))
        })
        .transpose()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
