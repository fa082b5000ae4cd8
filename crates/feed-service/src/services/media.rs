//! Media ingestion
//!
//! Uploaded files are written to a local directory under a random name and
//! served back by the API from `/media`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use feed_common::StorageConfig;
use feed_core::{DomainError, MediaIngestor, MediaUpload, RepoResult};
use tracing::{info, instrument};
use uuid::Uuid;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use crate::dto::UploadResponse;

/// Stores uploads on local disk
#[derive(Debug, Clone)]
pub struct LocalMediaIngestor {
    dir: PathBuf,
    base_url: String,
    max_bytes: usize,
}

impl LocalMediaIngestor {
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            &config.upload_dir,
            &config.media_base_url,
            config.max_file_size_bytes(),
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn stored_name(upload: &MediaUpload) -> String {
        let id = Uuid::new_v4().simple();
        match upload.extension() {
            Some(ext) => format!("{id}.{ext}"),
            None => id.to_string(),
        }
    }
}

#[async_trait]
impl MediaIngestor for LocalMediaIngestor {
    #[instrument(skip(self, upload), fields(size = upload.len(), content_type = %upload.content_type))]
    async fn ingest(&self, upload: MediaUpload) -> RepoResult<String> {
        if upload.is_empty() {
            return Err(DomainError::InvalidArgument("No file uploaded".to_string()));
        }
        if upload.len() > self.max_bytes {
            return Err(DomainError::FileTooLarge {
                max_bytes: self.max_bytes,
            });
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DomainError::UploadFailed(e.to_string()))?;

        let name = Self::stored_name(&upload);
        tokio::fs::write(self.dir.join(&name), &upload.bytes)
            .await
            .map_err(|e| DomainError::UploadFailed(e.to_string()))?;

        info!(file = %name, "Media stored");
        Ok(format!("{}/{name}", self.base_url))
    }
}

/// Standalone uploads (`POST /api/upload`)
pub struct MediaService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MediaService<'a> {
    /// Create a new MediaService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn upload(&self, upload: Option<MediaUpload>) -> ServiceResult<UploadResponse> {
        let upload = upload.ok_or_else(|| ServiceError::invalid_argument("No file uploaded"))?;
        let url = self.ctx.media_ingestor().ingest(upload).await?;
        Ok(UploadResponse { url })
    }
}
