//! Test helpers for integration tests
//!
//! Spawns a server on an ephemeral port and wraps the HTTP calls tests need.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use feed_api::{create_app, create_app_state, AppState};
use feed_common::AppConfig;
use reqwest::{multipart, Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: AppState,
    upload_dir: PathBuf,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server on the in-memory backends
    pub async fn start() -> Result<Self> {
        let upload_dir = scratch_upload_dir();
        Self::start_with_config(test_config(&upload_dir)?, upload_dir).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig, upload_dir: PathBuf) -> Result<Self> {
        let state = create_app_state(config).await?;
        let app = create_app(state.clone());

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            addr,
            client,
            state,
            upload_dir,
            handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).json(body).send().await?)
    }

    /// Make a POST request without a body
    pub async fn post_empty(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).send().await?)
    }

    /// Make a POST request with a multipart form
    pub async fn post_multipart(&self, path: &str, form: multipart::Form) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).multipart(form).send().await?)
    }

    /// Make a PATCH request with JSON body
    pub async fn patch<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.patch(&url).json(body).send().await?)
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.delete(&url).send().await?)
    }

    /// Make a DELETE request with JSON body
    pub async fn delete_json<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.delete(&url).json(body).send().await?)
    }

    /// Land queued counter deltas so store reads see them
    pub async fn settle(&self) {
        self.state.service_context().dispatcher().flush().await;
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

/// A fresh directory name under the system temp dir
pub fn scratch_upload_dir() -> PathBuf {
    std::env::temp_dir().join(format!("feed-it-{}", uuid::Uuid::new_v4().simple()))
}

/// Configuration for in-memory backends with fast retries
pub fn test_config(upload_dir: &Path) -> Result<AppConfig> {
    let vars: HashMap<&str, String> = HashMap::from([
        ("APP_ENV", "development".to_string()),
        ("API_PORT", "0".to_string()),
        ("STORE_BACKEND", "memory".to_string()),
        ("VIEWER_STORE_BACKEND", "memory".to_string()),
        ("UPLOAD_DIR", upload_dir.display().to_string()),
        ("MAX_FILE_SIZE_MB", "1".to_string()),
        ("FEED_POLL_INTERVAL_MS", "60000".to_string()),
        ("DELTA_RETRY_BASE_MS", "1".to_string()),
    ]);

    AppConfig::from_lookup(|key| vars.get(key).cloned())
        .map_err(|e| anyhow::anyhow!("Config error: {}", e))
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert an error response and return its `error.code`
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let body: serde_json::Value = assert_json(response, expected_status).await?;
    body["error"]["code"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Missing error code in {}", body))
}
