//! Casita Core Library
//!
//! Domain types and shared plumbing for the casita listing backend:
//! the `Item`/`MediaRef` models, the record normalizer, the error
//! taxonomy, configuration, and filename sanitization.

pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod validation;

pub use config::{Config, ItemsBackend, MediaBackend, DEFAULT_WHATSAPP_MESSAGE};
pub use error::{AppError, LogLevel};
pub use models::{
    FieldPolicy, Item, ItemDraft, ItemPatch, MediaKind, MediaRef, PublicItem, PublicMediaRef,
    StoredItem, StoredMediaRef,
};
pub use normalize::normalize;
pub use validation::sanitize_filename;
