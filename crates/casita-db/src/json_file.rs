//! JSON-file item repository
//!
//! Persists all items as a single JSON array file. Mutations take a write
//! lock, read the whole file, mutate in memory, write to a temp file in the
//! same directory, and rename over the original — readers see either the old
//! or the new array, never a torn write.

use crate::traits::ItemRepository;
use async_trait::async_trait;
use casita_core::{AppError, FieldPolicy, ItemDraft, ItemPatch, StoredItem};
use chrono::Utc;
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
    /// Serializes writers. Readers go straight to the file.
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileRepository {
    /// Open (or lazily create) the data file at `path`.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::Internal(format!(
                        "Failed to create data directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(JsonFileRepository {
            path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    async fn load(&self) -> Result<Vec<StoredItem>, AppError> {
        let raw = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::Internal(format!(
                    "Failed to read data file {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if raw.is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&raw).map_err(|e| {
            AppError::Internal(format!(
                "Data file {} is not a valid item array: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Atomic rewrite: temp file in the same directory, then rename.
    async fn save(&self, items: &[StoredItem]) -> Result<(), AppError> {
        let json = serde_json::to_vec_pretty(items)
            .map_err(|e| AppError::Internal(format!("Failed to serialize items: {}", e)))?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, &json).await.map_err(|e| {
            AppError::Internal(format!(
                "Failed to write data file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;
        fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            AppError::Internal(format!(
                "Failed to replace data file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(())
    }
}

#[async_trait]
impl ItemRepository for JsonFileRepository {
    fn field_policy(&self) -> FieldPolicy {
        FieldPolicy::DefaultEmpty
    }

    #[tracing::instrument(skip(self), fields(db.backend = "json_file", db.operation = "list"))]
    async fn list(&self) -> Result<Vec<StoredItem>, AppError> {
        self.load().await
    }

    #[tracing::instrument(skip(self), fields(db.backend = "json_file", db.operation = "get", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<StoredItem>, AppError> {
        Ok(self.load().await?.into_iter().find(|item| item.id == id))
    }

    #[tracing::instrument(skip(self, draft), fields(db.backend = "json_file", db.operation = "insert"))]
    async fn create(&self, draft: ItemDraft) -> Result<StoredItem, AppError> {
        let _guard = self.write_lock.lock().await;

        let stored = StoredItem {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            whatsapp_message: Some(JsonValue::String(draft.whatsapp_message)),
            media: draft.media.into_iter().map(Into::into).collect(),
            url: None,
            media_type: None,
            filename: None,
            created_at: Utc::now(),
        };

        let mut items = self.load().await?;
        items.push(stored.clone());
        self.save(&items).await?;

        Ok(stored)
    }

    #[tracing::instrument(skip(self, patch), fields(db.backend = "json_file", db.operation = "update", db.record_id = %id))]
    async fn update(&self, id: Uuid, patch: ItemPatch) -> Result<Option<StoredItem>, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut items = self.load().await?;
        let Some(item) = items.iter_mut().find(|item| item.id == id) else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            item.title = title;
        }
        if let Some(description) = patch.description {
            item.description = description;
        }
        if let Some(message) = patch.whatsapp_message {
            item.whatsapp_message = Some(JsonValue::String(message));
        }
        if let Some(media) = patch.media {
            item.media = media.into_iter().map(Into::into).collect();
            // The canonical list supersedes any legacy single-media fields.
            item.url = None;
            item.media_type = None;
            item.filename = None;
        }

        let updated = item.clone();
        self.save(&items).await?;

        Ok(Some(updated))
    }

    #[tracing::instrument(skip(self), fields(db.backend = "json_file", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut items = self.load().await?;
        let before = items.len();
        items.retain(|item| item.id != id);

        if items.len() == before {
            return Ok(false);
        }

        self.save(&items).await?;
        Ok(true)
    }
}
