//! Media ingestion port

use async_trait::async_trait;

use super::repositories::RepoResult;

/// A file handed over for ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MediaUpload {
    pub fn new(file_name: Option<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name,
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Lowercased extension of the original file name, if it has a sane one
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let (_, ext) = name.rsplit_once('.')?;
        let valid = !ext.is_empty() && ext.len() <= 8 && ext.bytes().all(|b| b.is_ascii_alphanumeric());
        valid.then(|| ext.to_ascii_lowercase())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Accepts a file and returns a URL it can be fetched from.
///
/// Failures surface as `DomainError::UploadFailed` (or a validation error for
/// rejected payloads) and abort whatever action started the upload.
#[async_trait]
pub trait MediaIngestor: Send + Sync {
    async fn ingest(&self, upload: MediaUpload) -> RepoResult<String>;
}
