use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Media kind, derived from the MIME prefix: `video/…` is a video,
/// everything else is treated as an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    /// Interpret a stored type label ("image"/"video"); anything else is an image.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("video") => MediaKind::Video,
            _ => MediaKind::Image,
        }
    }
}

/// One stored image or video belonging to an item.
///
/// The blob behind `storage_key` is owned by exactly one item; replacing or
/// deleting the item's media set must delete the orphaned blobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(rename = "storageKey", default)]
    pub storage_key: String,
    #[serde(rename = "contentType", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub url: String,
}

/// Canonical item shape, produced by `normalize` on every read.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub whatsapp_message: String,
    pub media: Vec<MediaRef>,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Project to the client-facing shape. Storage keys and filenames never
    /// leave the server.
    pub fn to_public(&self) -> PublicItem {
        PublicItem {
            id: self.id,
            title: self.title.clone(),
            desc: self.description.clone(),
            whatsapp_message: self.whatsapp_message.clone(),
            media: self
                .media
                .iter()
                .map(|m| PublicMediaRef {
                    kind: m.kind,
                    url: m.url.clone(),
                })
                .collect(),
            created_at: self.created_at,
        }
    }
}

/// Public response representation of an item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicItem {
    pub id: Uuid,
    pub title: String,
    pub desc: String,
    #[serde(rename = "whatsappMessage")]
    pub whatsapp_message: String,
    pub media: Vec<PublicMediaRef>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicMediaRef {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
}

/// Persisted record shape, read leniently.
///
/// Tolerates the legacy single-media layout (top-level `url`/`type`/
/// `filename`) and a missing or non-string WhatsApp message. `normalize`
/// reconciles this into an `Item`; nothing deeper in the system branches on
/// the legacy shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredItem {
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "desc")]
    pub description: String,
    /// Kept as raw JSON so a non-string value survives until normalization.
    #[serde(rename = "whatsappMessage", default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_message: Option<JsonValue>,
    #[serde(default)]
    pub media: Vec<StoredMediaRef>,
    // Legacy single-media fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Lenient media entry as persisted. Any field may be missing in old data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredMediaRef {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(
        rename = "storageKey",
        alias = "storage_key",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub storage_key: Option<String>,
    #[serde(
        rename = "contentType",
        alias = "content_type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl From<MediaRef> for StoredMediaRef {
    fn from(m: MediaRef) -> Self {
        StoredMediaRef {
            kind: Some(
                match m.kind {
                    MediaKind::Image => "image",
                    MediaKind::Video => "video",
                }
                .to_string(),
            ),
            storage_key: Some(m.storage_key),
            content_type: m.content_type,
            url: Some(m.url),
            filename: None,
        }
    }
}

impl From<Item> for StoredItem {
    fn from(item: Item) -> Self {
        StoredItem {
            id: item.id,
            title: item.title,
            description: item.description,
            whatsapp_message: Some(JsonValue::String(item.whatsapp_message)),
            media: item.media.into_iter().map(Into::into).collect(),
            url: None,
            media_type: None,
            filename: None,
            created_at: item.created_at,
        }
    }
}

/// Field values for a new item. Validation and defaulting happen before this
/// reaches a repository.
#[derive(Debug, Clone)]
pub struct ItemDraft {
    pub title: String,
    pub description: String,
    pub whatsapp_message: String,
    pub media: Vec<MediaRef>,
}

/// Partial update. `Some` replaces the field, `None` retains the stored value;
/// the handler only passes `Some` for non-empty replacements.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub whatsapp_message: Option<String>,
    pub media: Option<Vec<MediaRef>>,
}

/// How a repository backend treats a missing title/description on create.
///
/// The file-backed variant historically defaulted them; the SQL-backed
/// variants reject. Both behaviors are preserved per backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Missing required fields become empty strings.
    DefaultEmpty,
    /// Missing required fields are a validation error.
    Reject,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_from_content_type() {
        assert_eq!(MediaKind::from_content_type("video/mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_content_type("video/webm"), MediaKind::Video);
        assert_eq!(MediaKind::from_content_type("image/png"), MediaKind::Image);
        assert_eq!(
            MediaKind::from_content_type("application/octet-stream"),
            MediaKind::Image
        );
    }

    #[test]
    fn test_media_kind_from_label() {
        assert_eq!(MediaKind::from_label(Some("video")), MediaKind::Video);
        assert_eq!(MediaKind::from_label(Some("image")), MediaKind::Image);
        assert_eq!(MediaKind::from_label(Some("gif")), MediaKind::Image);
        assert_eq!(MediaKind::from_label(None), MediaKind::Image);
    }

    #[test]
    fn test_public_projection_hides_storage_keys() {
        let item = Item {
            id: Uuid::new_v4(),
            title: "Casa".to_string(),
            description: "Bonita".to_string(),
            whatsapp_message: "hola".to_string(),
            media: vec![MediaRef {
                kind: MediaKind::Image,
                storage_key: "1700000000-abcd1234-foto.png".to_string(),
                content_type: Some("image/png".to_string()),
                url: "/uploads/1700000000-abcd1234-foto.png".to_string(),
            }],
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(item.to_public()).unwrap();
        assert_eq!(json["title"], "Casa");
        assert_eq!(json["desc"], "Bonita");
        assert_eq!(json["media"][0]["type"], "image");
        assert!(json["media"][0].get("storageKey").is_none());
        assert!(json["media"][0].get("contentType").is_none());
    }

    #[test]
    fn test_stored_item_reads_legacy_shape() {
        let raw = serde_json::json!({
            "id": Uuid::new_v4(),
            "title": "Depto",
            "desc": "Céntrico",
            "url": "/uploads/old.jpg",
            "type": "image",
            "filename": "old.jpg",
            "createdAt": Utc::now(),
        });

        let stored: StoredItem = serde_json::from_value(raw).unwrap();
        assert!(stored.media.is_empty());
        assert_eq!(stored.url.as_deref(), Some("/uploads/old.jpg"));
        assert_eq!(stored.description, "Céntrico");
    }
}
