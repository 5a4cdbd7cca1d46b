//! Casita Storage Library
//!
//! Media blob storage for the listing backend: the `MediaStore` trait plus a
//! local filesystem implementation and an S3/object-store implementation.
//!
//! # Storage key format
//!
//! Keys are flat and collision-resistant:
//! `{unix_millis}-{random8}-{sanitized_filename}`. The local backend rejects
//! any key that resolves outside its base directory. Key generation is
//! centralized in the `keys` module so both backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

pub use factory::create_media_store;
pub use keys::generate_storage_key;
#[cfg(feature = "storage-local")]
pub use local::LocalMediaStore;
#[cfg(feature = "storage-s3")]
pub use s3::S3MediaStore;
pub use traits::{MediaStore, StorageError, StorageResult, StoredBlob};
