//! Item repository abstraction
//!
//! All backends expose the same five operations. Every mutating operation
//! must leave the backing store either in the pre-call state or the fully
//! updated state; a concurrent `list`/`get` never observes a partial write.

use async_trait::async_trait;
use casita_core::{AppError, FieldPolicy, ItemDraft, ItemPatch, StoredItem};
use uuid::Uuid;

#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// How this backend treats a missing title/description on create.
    fn field_policy(&self) -> FieldPolicy;

    /// All items. The file backend lists in insertion order, the SQL backend
    /// by creation time descending.
    async fn list(&self) -> Result<Vec<StoredItem>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<StoredItem>, AppError>;

    /// Persist a new item with a fresh id and creation timestamp.
    async fn create(&self, draft: ItemDraft) -> Result<StoredItem, AppError>;

    /// Apply a partial update. `Some` fields replace, `None` fields are
    /// retained. Returns `None` when the id is unknown.
    async fn update(&self, id: Uuid, patch: ItemPatch) -> Result<Option<StoredItem>, AppError>;

    /// Delete an item. Returns `false` when the id was unknown.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}
