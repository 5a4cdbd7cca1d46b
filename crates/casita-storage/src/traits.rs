//! Storage abstraction trait
//!
//! This module defines the `MediaStore` trait that all blob backends must
//! implement. The request handlers work against this trait and never touch a
//! backend directly.

use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A stored blob: its opaque key plus the address clients fetch it from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub storage_key: String,
    pub url: String,
}

/// Blob storage abstraction.
///
/// **Key format:** `{unix_millis}-{random8}-{sanitized_filename}`, generated
/// by `keys::generate_storage_key` so concurrent uploads of the same filename
/// never overwrite each other.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store a blob under a freshly generated key and return key + URL.
    async fn store(
        &self,
        original_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredBlob>;

    /// Fetchable address for an existing key (public URL or serve path).
    fn resolve_url(&self, storage_key: &str) -> String;

    /// Delete a blob. Idempotent: deleting a nonexistent key is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a blob exists.
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;
}
