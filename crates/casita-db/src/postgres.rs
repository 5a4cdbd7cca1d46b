//! Postgres item repository
//!
//! One row per item, media as a JSONB array. Every mutation is a single
//! statement, so the database's own statement atomicity gives observers the
//! pre-call or fully-updated state with no application-level locking.

use crate::traits::ItemRepository;
use async_trait::async_trait;
use casita_core::{AppError, FieldPolicy, ItemDraft, ItemPatch, MediaRef, StoredItem, StoredMediaRef};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Apply pending migrations (creates the `items` table).
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!()
        .run(pool)
        .await
        .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    title: String,
    description: String,
    whatsapp_message: String,
    media: JsonValue,
    created_at: DateTime<Utc>,
}

impl ItemRow {
    /// Lenient row-to-record conversion. The media column is normally a JSON
    /// array; an old-style single object with a `url` is mapped onto the
    /// legacy fields so `normalize` reconciles it like any other record.
    fn into_stored(self) -> StoredItem {
        let (media, legacy_url, legacy_type, legacy_filename) = match &self.media {
            JsonValue::Array(_) => (
                serde_json::from_value::<Vec<StoredMediaRef>>(self.media.clone())
                    .unwrap_or_default(),
                None,
                None,
                None,
            ),
            JsonValue::Object(obj) if obj.contains_key("url") => (
                Vec::new(),
                obj.get("url").and_then(|v| v.as_str()).map(String::from),
                obj.get("type").and_then(|v| v.as_str()).map(String::from),
                obj.get("filename").and_then(|v| v.as_str()).map(String::from),
            ),
            _ => (Vec::new(), None, None, None),
        };

        StoredItem {
            id: self.id,
            title: self.title,
            description: self.description,
            // An empty column means the message was never set; normalize
            // applies the default.
            whatsapp_message: if self.whatsapp_message.is_empty() {
                None
            } else {
                Some(JsonValue::String(self.whatsapp_message))
            },
            media,
            url: legacy_url,
            media_type: legacy_type,
            filename: legacy_filename,
            created_at: self.created_at,
        }
    }
}

fn media_to_json(media: Vec<MediaRef>) -> JsonValue {
    serde_json::to_value(
        media
            .into_iter()
            .map(StoredMediaRef::from)
            .collect::<Vec<_>>(),
    )
    .unwrap_or_else(|_| JsonValue::Array(Vec::new()))
}

const ITEM_COLUMNS: &str = "id, title, description, whatsapp_message, media, created_at";

#[derive(Clone)]
pub struct PgItemRepository {
    pool: PgPool,
}

impl PgItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    fn field_policy(&self) -> FieldPolicy {
        FieldPolicy::Reject
    }

    #[tracing::instrument(skip(self), fields(db.table = "items", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<StoredItem>, AppError> {
        let rows = sqlx::query_as::<Postgres, ItemRow>(&format!(
            "SELECT {} FROM items ORDER BY created_at DESC",
            ITEM_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ItemRow::into_stored).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "items", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<StoredItem>, AppError> {
        let row = sqlx::query_as::<Postgres, ItemRow>(&format!(
            "SELECT {} FROM items WHERE id = $1",
            ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ItemRow::into_stored))
    }

    #[tracing::instrument(skip(self, draft), fields(db.table = "items", db.operation = "insert"))]
    async fn create(&self, draft: ItemDraft) -> Result<StoredItem, AppError> {
        let row = sqlx::query_as::<Postgres, ItemRow>(&format!(
            r#"
            INSERT INTO items (id, title, description, whatsapp_message, media, created_at)
            VALUES ($1, $2, $3, $4, $5, now())
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.whatsapp_message)
        .bind(media_to_json(draft.media))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_stored())
    }

    #[tracing::instrument(skip(self, patch), fields(db.table = "items", db.operation = "update", db.record_id = %id))]
    async fn update(&self, id: Uuid, patch: ItemPatch) -> Result<Option<StoredItem>, AppError> {
        let row = sqlx::query_as::<Postgres, ItemRow>(&format!(
            r#"
            UPDATE items
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                whatsapp_message = COALESCE($4, whatsapp_message),
                media = COALESCE($5, media)
            WHERE id = $1
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.whatsapp_message)
        .bind(patch.media.map(media_to_json))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ItemRow::into_stored))
    }

    #[tracing::instrument(skip(self), fields(db.table = "items", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
