//! Item normalization
//!
//! Every record read from a repository passes through `normalize` exactly
//! once, at the boundary. Legacy single-media records are materialized into a
//! one-element media list, and a missing or non-string WhatsApp message is
//! replaced with the configured default. Nothing downstream branches on the
//! legacy shape.

use serde_json::Value as JsonValue;

use crate::models::{Item, MediaKind, MediaRef, StoredItem, StoredMediaRef};

/// Reconcile a stored record into the canonical `Item` shape.
///
/// Idempotent: normalizing an already-normalized item (round-tripped through
/// `StoredItem`) yields the same result. A record with neither media nor a
/// legacy `url` is malformed but still readable; it comes back with an empty
/// media list rather than an error.
pub fn normalize(stored: StoredItem, default_whatsapp: &str) -> Item {
    let media = if !stored.media.is_empty() {
        stored.media.into_iter().map(normalize_media_ref).collect()
    } else if let Some(url) = stored.url {
        vec![MediaRef {
            kind: MediaKind::from_label(stored.media_type.as_deref()),
            storage_key: stored.filename.unwrap_or_default(),
            content_type: None,
            url,
        }]
    } else {
        Vec::new()
    };

    let whatsapp_message = match stored.whatsapp_message {
        Some(JsonValue::String(s)) => s,
        _ => default_whatsapp.to_string(),
    };

    Item {
        id: stored.id,
        title: stored.title,
        description: stored.description,
        whatsapp_message,
        media,
        created_at: stored.created_at,
    }
}

fn normalize_media_ref(stored: StoredMediaRef) -> MediaRef {
    let kind = match stored.kind.as_deref() {
        Some(label) => MediaKind::from_label(Some(label)),
        None => stored
            .content_type
            .as_deref()
            .map(MediaKind::from_content_type)
            .unwrap_or(MediaKind::Image),
    };

    MediaRef {
        kind,
        storage_key: stored
            .storage_key
            .or(stored.filename)
            .unwrap_or_default(),
        content_type: stored.content_type,
        url: stored.url.unwrap_or_default(),
    }
}
