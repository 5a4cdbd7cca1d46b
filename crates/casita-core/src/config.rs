//! Configuration module
//!
//! Environment-driven configuration for the listing backend. The default
//! WhatsApp message and the upload size ceiling are explicit configuration
//! passed into the request handlers, never ambient globals.

use std::env;

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_DATA_FILE: &str = "data/items.json";
const DEFAULT_UPLOADS_DIR: &str = "uploads";
const DEFAULT_UPLOADS_BASE_URL: &str = "/uploads";
const DEFAULT_STATIC_SITE_DIR: &str = "public";

/// Upload ceiling when media is kept on the local filesystem.
const LOCAL_MAX_UPLOAD_MB: usize = 500;
/// Upload ceiling when media goes to an object store (hosted profile).
const HOSTED_MAX_UPLOAD_MB: usize = 40;

/// Canned WhatsApp contact message applied when an item has none.
pub const DEFAULT_WHATSAPP_MESSAGE: &str =
    "Hola, me interesa esta propiedad. ¿Podría darme más información?";

/// Media store backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaBackend {
    Local,
    S3,
}

/// Item repository backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemsBackend {
    JsonFile,
    Postgres,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub items_backend: ItemsBackend,
    pub media_backend: MediaBackend,
    /// Required when `items_backend` is Postgres.
    pub database_url: Option<String>,
    /// JSON array file used by the file-backed item repository.
    pub data_file: String,
    /// Directory the local media store writes into.
    pub uploads_dir: String,
    /// URL prefix under which uploaded media is served.
    pub uploads_base_url: String,
    /// Front-end site bundle served at the root, if present.
    pub static_site_dir: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    /// Per-file upload ceiling in bytes.
    pub max_upload_bytes: usize,
    pub default_whatsapp_message: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let media_backend = match env::var("MEDIA_BACKEND").as_deref() {
            Ok("s3") => MediaBackend::S3,
            Ok("local") | Err(_) => MediaBackend::Local,
            Ok(other) => anyhow::bail!("Unknown MEDIA_BACKEND '{}', expected 'local' or 's3'", other),
        };
        let items_backend = match env::var("ITEMS_BACKEND").as_deref() {
            Ok("postgres") => ItemsBackend::Postgres,
            Ok("file") | Err(_) => ItemsBackend::JsonFile,
            Ok(other) => anyhow::bail!("Unknown ITEMS_BACKEND '{}', expected 'file' or 'postgres'", other),
        };

        let default_max_mb = match media_backend {
            MediaBackend::Local => LOCAL_MAX_UPLOAD_MB,
            MediaBackend::S3 => HOSTED_MAX_UPLOAD_MB,
        };
        let max_upload_bytes = env::var("MAX_UPLOAD_MB")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(default_max_mb)
            * 1024
            * 1024;

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            items_backend,
            media_backend,
            database_url: env::var("DATABASE_URL").ok(),
            data_file: env::var("DATA_FILE").unwrap_or_else(|_| DEFAULT_DATA_FILE.to_string()),
            uploads_dir: env::var("UPLOADS_DIR").unwrap_or_else(|_| DEFAULT_UPLOADS_DIR.to_string()),
            uploads_base_url: env::var("UPLOADS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_UPLOADS_BASE_URL.to_string()),
            static_site_dir: env::var("STATIC_SITE_DIR")
                .ok()
                .or_else(|| Some(DEFAULT_STATIC_SITE_DIR.to_string()))
                .filter(|s| !s.is_empty()),
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok().or_else(|| env::var("AWS_REGION").ok()),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            max_upload_bytes,
            default_whatsapp_message: env::var("DEFAULT_WHATSAPP_MESSAGE")
                .unwrap_or_else(|_| DEFAULT_WHATSAPP_MESSAGE.to_string()),
        })
    }

    /// Fail fast on misconfiguration before any listener is bound.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.items_backend == ItemsBackend::Postgres && self.database_url.is_none() {
            anyhow::bail!("DATABASE_URL is required when ITEMS_BACKEND=postgres");
        }
        if self.media_backend == MediaBackend::S3 {
            if self.s3_bucket.is_none() {
                anyhow::bail!("S3_BUCKET is required when MEDIA_BACKEND=s3");
            }
            if self.s3_region.is_none() {
                anyhow::bail!("S3_REGION or AWS_REGION is required when MEDIA_BACKEND=s3");
            }
        }
        if self.max_upload_bytes == 0 {
            anyhow::bail!("MAX_UPLOAD_MB must be greater than zero");
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server_port: 3000,
            environment: "test".to_string(),
            items_backend: ItemsBackend::JsonFile,
            media_backend: MediaBackend::Local,
            database_url: None,
            data_file: "data/items.json".to_string(),
            uploads_dir: "uploads".to_string(),
            uploads_base_url: "/uploads".to_string(),
            static_site_dir: None,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            max_upload_bytes: 500 * 1024 * 1024,
            default_whatsapp_message: DEFAULT_WHATSAPP_MESSAGE.to_string(),
        }
    }

    #[test]
    fn test_validate_local_profile() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_validate_postgres_requires_url() {
        let mut config = base_config();
        config.items_backend = ItemsBackend::Postgres;
        assert!(config.validate().is_err());

        config.database_url = Some("postgres://localhost/casita".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_s3_requires_bucket_and_region() {
        let mut config = base_config();
        config.media_backend = MediaBackend::S3;
        assert!(config.validate().is_err());

        config.s3_bucket = Some("listing-media".to_string());
        assert!(config.validate().is_err());

        config.s3_region = Some("us-east-1".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_is_production() {
        let mut config = base_config();
        assert!(!config.is_production());
        config.environment = "Production".to_string();
        assert!(config.is_production());
    }
}
