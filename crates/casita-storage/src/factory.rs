#[cfg(feature = "storage-local")]
use crate::LocalMediaStore;
#[cfg(feature = "storage-s3")]
use crate::S3MediaStore;
use crate::{MediaStore, StorageError, StorageResult};
use casita_core::{Config, MediaBackend};
use std::sync::Arc;

/// Create a media store from configuration.
pub async fn create_media_store(config: &Config) -> StorageResult<Arc<dyn MediaStore>> {
    match config.media_backend {
        #[cfg(feature = "storage-local")]
        MediaBackend::Local => {
            let store = LocalMediaStore::new(
                config.uploads_dir.clone(),
                config.uploads_base_url.clone(),
            )
            .await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-local"))]
        MediaBackend::Local => Err(StorageError::ConfigError(
            "Local media backend not available (storage-local feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-s3")]
        MediaBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let store = S3MediaStore::new(bucket, region, config.s3_endpoint.clone()).await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-s3"))]
        MediaBackend::S3 => Err(StorageError::ConfigError(
            "S3 media backend not available (storage-s3 feature not enabled)".to_string(),
        )),
    }
}
