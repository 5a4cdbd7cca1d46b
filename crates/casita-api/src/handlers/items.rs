//! CRUD handlers for listing items.
//!
//! Every read goes through `normalize`, so legacy records and missing fields
//! never reach a client. Writes persist the canonical shape. Blob cleanup on
//! delete and media replacement is best effort: a failed blob delete is
//! logged, never surfaced.

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use casita_core::{
    normalize, AppError, FieldPolicy, Item, ItemDraft, ItemPatch, MediaKind, MediaRef, PublicItem,
};
use casita_storage::MediaStore;
use serde_json::json;
use uuid::Uuid;

use crate::error::{storage_error_to_app, HttpAppError};
use crate::payload::{self, ItemPayload, MediaDescriptor, UploadedFile};
use crate::state::AppState;

/// GET /api/items
pub async fn list_items(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicItem>>, HttpAppError> {
    let stored = state.items.list().await?;

    let items: Vec<PublicItem> = stored
        .into_iter()
        .map(|record| {
            let mut item = normalize(record, &state.config.default_whatsapp_message);
            resolve_media_urls(&mut item, state.media.as_ref());
            item.to_public()
        })
        .collect();

    Ok(Json(items))
}

/// GET /api/items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicItem>, HttpAppError> {
    let id = parse_item_id(&id)?;

    let stored = state
        .items
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item {} not found", id)))?;

    let mut item = normalize(stored, &state.config.default_whatsapp_message);
    resolve_media_urls(&mut item, state.media.as_ref());
    Ok(Json(item.to_public()))
}

/// POST /api/items
pub async fn create_item(
    State(state): State<AppState>,
    req: Request,
) -> Result<impl IntoResponse, HttpAppError> {
    let payload = payload::parse(req, state.config.max_upload_bytes).await?;

    let (title, description) =
        required_fields(&payload, state.items.field_policy())?;
    let whatsapp_message = payload
        .text("whatsappMessage")
        .map(str::to_string)
        .unwrap_or_else(|| state.config.default_whatsapp_message.clone());

    let media = if !payload.files.is_empty() {
        store_files(&state, &payload.files).await?
    } else if !payload.media.is_empty() {
        descriptors_to_media(&payload.media)
    } else {
        return Err(AppError::InvalidInput(
            "At least one media file or media descriptor is required".to_string(),
        )
        .into());
    };

    let stored = state
        .items
        .create(ItemDraft {
            title,
            description,
            whatsapp_message,
            media,
        })
        .await?;

    tracing::info!(item.id = %stored.id, media.count = stored.media.len(), "Item created");

    let mut item = normalize(stored, &state.config.default_whatsapp_message);
    resolve_media_urls(&mut item, state.media.as_ref());
    Ok((StatusCode::CREATED, Json(item.to_public())))
}

/// PUT /api/items/{id}
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    req: Request,
) -> Result<Json<PublicItem>, HttpAppError> {
    let id = parse_item_id(&id)?;

    let existing = state
        .items
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item {} not found", id)))?;

    let payload = payload::parse(req, state.config.max_upload_bytes).await?;

    let mut patch = ItemPatch {
        title: payload.text("title").map(str::to_string),
        description: payload
            .text("desc")
            .or_else(|| payload.text("description"))
            .map(str::to_string),
        whatsapp_message: payload.text("whatsappMessage").map(str::to_string),
        media: None,
    };

    if !payload.files.is_empty() {
        // New uploads replace the whole media set; the previous blobs are
        // orphaned and get cleaned up in the background.
        let new_media = store_files(&state, &payload.files).await?;
        let old = normalize(existing, &state.config.default_whatsapp_message);
        spawn_blob_cleanup(state.media.clone(), storage_keys(&old.media));
        patch.media = Some(new_media);
    } else if !payload.media.is_empty() {
        // Descriptor-only replacement rewrites the references without
        // touching blobs; the client may be re-ordering existing media.
        patch.media = Some(descriptors_to_media(&payload.media));
    }

    let stored = state
        .items
        .update(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item {} not found", id)))?;

    tracing::info!(item.id = %id, "Item updated");

    let mut item = normalize(stored, &state.config.default_whatsapp_message);
    resolve_media_urls(&mut item, state.media.as_ref());
    Ok(Json(item.to_public()))
}

/// DELETE /api/items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, HttpAppError> {
    let id = parse_item_id(&id)?;

    let existing = state
        .items
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item {} not found", id)))?;

    let item = normalize(existing, &state.config.default_whatsapp_message);

    if !state.items.delete(id).await? {
        return Err(AppError::NotFound(format!("Item {} not found", id)).into());
    }

    // The record is gone; failed blob deletes only leak disk space.
    for key in storage_keys(&item.media) {
        if let Err(err) = state.media.delete(&key).await {
            tracing::warn!(storage.key = %key, error = %err, "Failed to delete media blob");
        }
    }

    tracing::info!(item.id = %id, "Item deleted");

    Ok(Json(json!({ "ok": true })))
}

/// PUT/DELETE on the collection path, where the id is missing.
pub async fn missing_item_id() -> HttpAppError {
    AppError::InvalidInput("Item id is required".to_string()).into()
}

/// Ids are opaque to clients; anything that does not parse names no item.
fn parse_item_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("Item {} not found", raw)))
}

fn required_fields(
    payload: &ItemPayload,
    policy: FieldPolicy,
) -> Result<(String, String), AppError> {
    let title = payload.text("title");
    let description = payload.text("desc").or_else(|| payload.text("description"));

    match policy {
        FieldPolicy::DefaultEmpty => Ok((
            title.unwrap_or_default().to_string(),
            description.unwrap_or_default().to_string(),
        )),
        FieldPolicy::Reject => {
            let title = title
                .ok_or_else(|| AppError::InvalidInput("Field 'title' is required".to_string()))?;
            let description = description
                .ok_or_else(|| AppError::InvalidInput("Field 'desc' is required".to_string()))?;
            Ok((title.to_string(), description.to_string()))
        }
    }
}

/// Upload every buffered file. If one upload fails, the blobs already
/// written are removed in the background and the whole request fails.
async fn store_files(state: &AppState, files: &[UploadedFile]) -> Result<Vec<MediaRef>, AppError> {
    let mut media = Vec::with_capacity(files.len());

    for file in files {
        let result = state
            .media
            .store(&file.original_name, &file.content_type, file.data.clone())
            .await;

        match result {
            Ok(blob) => media.push(MediaRef {
                kind: MediaKind::from_content_type(&file.content_type),
                storage_key: blob.storage_key,
                content_type: Some(file.content_type.clone()),
                url: blob.url,
            }),
            Err(err) => {
                spawn_blob_cleanup(state.media.clone(), storage_keys(&media));
                return Err(storage_error_to_app(err));
            }
        }
    }

    Ok(media)
}

fn descriptors_to_media(descriptors: &[MediaDescriptor]) -> Vec<MediaRef> {
    descriptors
        .iter()
        .map(|d| MediaRef {
            kind: MediaKind::from_label(d.kind.as_deref()),
            storage_key: d.filename.clone().unwrap_or_default(),
            content_type: None,
            url: d.url.clone(),
        })
        .collect()
}

fn storage_keys(media: &[MediaRef]) -> Vec<String> {
    media
        .iter()
        .filter(|m| !m.storage_key.is_empty())
        .map(|m| m.storage_key.clone())
        .collect()
}

fn spawn_blob_cleanup(store: std::sync::Arc<dyn MediaStore>, keys: Vec<String>) {
    if keys.is_empty() {
        return;
    }
    tokio::spawn(async move {
        for key in keys {
            if let Err(err) = store.delete(&key).await {
                tracing::warn!(storage.key = %key, error = %err, "Failed to delete media blob");
            }
        }
    });
}

/// Records written before URL resolution existed carry a storage key but no
/// usable URL; rebuild it from the active media store.
fn resolve_media_urls(item: &mut Item, store: &dyn MediaStore) {
    for media in &mut item.media {
        if media.url.is_empty() && !media.storage_key.is_empty() {
            media.url = store.resolve_url(&media.storage_key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_id_rejects_garbage() {
        assert!(matches!(
            parse_item_id("not-a-uuid"),
            Err(AppError::NotFound(_))
        ));
        assert!(parse_item_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
    }

    #[test]
    fn test_required_fields_default_empty_policy() {
        let payload = ItemPayload::default();
        let (title, desc) = required_fields(&payload, FieldPolicy::DefaultEmpty).unwrap();
        assert_eq!(title, "");
        assert_eq!(desc, "");
    }

    #[test]
    fn test_required_fields_reject_policy() {
        let mut payload = ItemPayload::default();
        assert!(required_fields(&payload, FieldPolicy::Reject).is_err());

        payload.fields.insert("title".into(), "Casa".into());
        payload.fields.insert("desc".into(), "Bonita".into());
        let (title, desc) = required_fields(&payload, FieldPolicy::Reject).unwrap();
        assert_eq!(title, "Casa");
        assert_eq!(desc, "Bonita");
    }

    #[test]
    fn test_descriptors_to_media_defaults() {
        let media = descriptors_to_media(&[MediaDescriptor {
            kind: Some("video".to_string()),
            url: "https://cdn.example.com/tour.mp4".to_string(),
            filename: None,
        }]);

        assert_eq!(media[0].kind, MediaKind::Video);
        assert_eq!(media[0].storage_key, "");
        assert_eq!(media[0].url, "https://cdn.example.com/tour.mp4");
    }
}
