use crate::keys::generate_storage_key;
use crate::traits::{MediaStore, StorageError, StorageResult, StoredBlob};
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};

/// S3 media store (works with any S3-compatible provider).
#[derive(Clone)]
pub struct S3MediaStore {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
}

impl S3MediaStore {
    /// Create a new S3 store.
    ///
    /// Credentials come from the environment (`AmazonS3Builder::from_env`).
    /// `endpoint_url` switches to path-style URLs for S3-compatible providers
    /// such as MinIO or DigitalOcean Spaces.
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3MediaStore {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Public URL for an object: virtual-hosted style on AWS, path style when
    /// a custom endpoint is configured.
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn store(
        &self,
        original_name: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredBlob> {
        let key = generate_storage_key(original_name);
        let size = data.len() as u64;
        let bytes = Bytes::from(data);
        let location = Path::from(key.clone());

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(bytes)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        let url = self.generate_url(&key);

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(StoredBlob {
            storage_key: key,
            url,
        })
    }

    fn resolve_url(&self, storage_key: &str) -> String {
        self.generate_url(storage_key)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let location = Path::from(storage_key.to_string());

        match self.store.delete(&location).await {
            Ok(()) => {}
            // Idempotent delete: a missing object is already gone.
            Err(ObjectStoreError::NotFound { .. }) => return Ok(()),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let location = Path::from(storage_key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> S3MediaStore {
        S3MediaStore::new(
            "listing-media".to_string(),
            "us-east-1".to_string(),
            None,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_aws_url_is_virtual_hosted_style() {
        let store = test_store().await;
        assert_eq!(
            store.resolve_url("123-abcd-foto.png"),
            "https://listing-media.s3.us-east-1.amazonaws.com/123-abcd-foto.png"
        );
    }

    #[tokio::test]
    async fn test_custom_endpoint_url_is_path_style() {
        let store = S3MediaStore::new(
            "listing-media".to_string(),
            "us-east-1".to_string(),
            Some("http://localhost:9000/".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(
            store.resolve_url("clip.mp4"),
            "http://localhost:9000/listing-media/clip.mp4"
        );
    }
}
