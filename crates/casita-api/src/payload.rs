//! Request body parsing for item create/update.
//!
//! The endpoints accept either `multipart/form-data` (text fields plus file
//! parts named `files`) or a JSON body carrying the same fields and an
//! optional `media` descriptor array. Both shapes decode into `ItemPayload`
//! so the handlers never branch on the wire format.

use std::collections::HashMap;

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use casita_core::{sanitize_filename, AppError};
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// One fully buffered file part.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field_name: String,
    /// Already sanitized to `[A-Za-z0-9._-]`.
    pub original_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Client-supplied media descriptor (JSON bodies without file uploads).
#[derive(Debug, Clone, Deserialize)]
pub struct MediaDescriptor {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Decoded request body: text fields, buffered files, media descriptors.
#[derive(Debug, Default)]
pub struct ItemPayload {
    pub fields: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
    pub media: Vec<MediaDescriptor>,
}

impl ItemPayload {
    /// A field's value, trimmed, or `None` when missing or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

/// Parse a request body into an `ItemPayload`, enforcing the per-file size
/// ceiling. An oversize file aborts the whole parse with `PayloadTooLarge`;
/// its buffered bytes are dropped and nothing is persisted.
pub async fn parse(req: Request, max_file_bytes: usize) -> Result<ItemPayload, AppError> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        parse_multipart(req, max_file_bytes).await
    } else {
        parse_json(req, max_file_bytes).await
    }
}

async fn parse_multipart(req: Request, max_file_bytes: usize) -> Result<ItemPayload, AppError> {
    let mut multipart = Multipart::from_request(req, &())
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart body: {}", e)))?;

    let mut payload = ItemPayload::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart field: {}", e)))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        if let Some(raw_name) = field.file_name() {
            let original_name = sanitize_filename(raw_name);
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();

            let mut data = Vec::new();
            while let Some(chunk) = field.chunk().await.map_err(|e| {
                AppError::InvalidInput(format!("Failed to read file data: {}", e))
            })? {
                if data.len() + chunk.len() > max_file_bytes {
                    return Err(AppError::PayloadTooLarge(format!(
                        "File '{}' exceeds the {} MiB upload limit",
                        original_name,
                        max_file_bytes / 1024 / 1024
                    )));
                }
                data.extend_from_slice(&chunk);
            }

            payload.files.push(UploadedFile {
                field_name,
                original_name,
                content_type,
                data,
            });
        } else {
            let value = field.text().await.map_err(|e| {
                AppError::InvalidInput(format!("Failed to read form field: {}", e))
            })?;
            payload.fields.insert(field_name, value);
        }
    }

    Ok(payload)
}

async fn parse_json(req: Request, max_body_bytes: usize) -> Result<ItemPayload, AppError> {
    let bytes = axum::body::to_bytes(req.into_body(), max_body_bytes)
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read request body: {}", e)))?;

    if bytes.is_empty() {
        return Ok(ItemPayload::default());
    }

    let value: JsonValue = serde_json::from_slice(&bytes)?;

    let mut payload = ItemPayload::default();
    if let Some(obj) = value.as_object() {
        for (key, val) in obj {
            if key == "media" {
                continue;
            }
            // Non-string values (e.g. a numeric whatsappMessage) are dropped
            // here; the normalizer applies the default downstream.
            if let Some(s) = val.as_str() {
                payload.fields.insert(key.clone(), s.to_string());
            }
        }
    }

    payload.media = value
        .get("media")
        .and_then(|m| serde_json::from_value::<Vec<MediaDescriptor>>(m.clone()).ok())
        .unwrap_or_default();

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    const MAX: usize = 1024 * 1024;

    fn multipart_request(boundary: &str, body: Vec<u8>) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/api/items")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(body: serde_json::Value) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/api/items")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn form_body(boundary: &str, fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for (filename, content_type, data) in files {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        body
    }

    #[tokio::test]
    async fn test_multipart_fields_and_files() {
        let body = form_body(
            "XX",
            &[("title", "Casa"), ("desc", "Bonita")],
            &[("foto.png", "image/png", b"pngdata")],
        );

        let payload = parse(multipart_request("XX", body), MAX).await.unwrap();

        assert_eq!(payload.text("title"), Some("Casa"));
        assert_eq!(payload.text("desc"), Some("Bonita"));
        assert_eq!(payload.files.len(), 1);
        assert_eq!(payload.files[0].original_name, "foto.png");
        assert_eq!(payload.files[0].content_type, "image/png");
        assert_eq!(payload.files[0].data, b"pngdata");
    }

    #[tokio::test]
    async fn test_multipart_sanitizes_filename() {
        let body = form_body("XX", &[], &[("mi foto (1).png", "image/png", b"x")]);

        let payload = parse(multipart_request("XX", body), MAX).await.unwrap();
        assert_eq!(payload.files[0].original_name, "mi_foto__1_.png");
    }

    #[tokio::test]
    async fn test_oversize_file_aborts_parse() {
        let big = vec![0u8; 64 * 1024];
        let body = form_body("XX", &[("title", "Casa")], &[("big.png", "image/png", &big)]);

        let result = parse(multipart_request("XX", body), 32 * 1024).await;
        assert!(matches!(result, Err(AppError::PayloadTooLarge(_))));
    }

    #[tokio::test]
    async fn test_json_body_yields_fields_and_descriptors() {
        let payload = parse(
            json_request(serde_json::json!({
                "title": "Depto",
                "desc": "Céntrico",
                "whatsappMessage": "Hola",
                "media": [
                    {"type": "video", "url": "https://cdn.example.com/clip.mp4"}
                ]
            })),
            MAX,
        )
        .await
        .unwrap();

        assert_eq!(payload.text("title"), Some("Depto"));
        assert_eq!(payload.text("whatsappMessage"), Some("Hola"));
        assert!(payload.files.is_empty());
        assert_eq!(payload.media.len(), 1);
        assert_eq!(payload.media[0].kind.as_deref(), Some("video"));
    }

    #[tokio::test]
    async fn test_json_non_string_field_is_dropped() {
        let payload = parse(
            json_request(serde_json::json!({"title": "Casa", "whatsappMessage": 42})),
            MAX,
        )
        .await
        .unwrap();

        assert_eq!(payload.text("title"), Some("Casa"));
        assert_eq!(payload.text("whatsappMessage"), None);
    }

    #[tokio::test]
    async fn test_empty_body_is_empty_payload() {
        let req = HttpRequest::builder()
            .method("POST")
            .uri("/api/items")
            .body(Body::empty())
            .unwrap();

        let payload = parse(req, MAX).await.unwrap();
        assert!(payload.fields.is_empty());
        assert!(payload.files.is_empty());
        assert!(payload.media.is_empty());
    }

    #[tokio::test]
    async fn test_blank_field_reads_as_missing() {
        let payload = parse(json_request(serde_json::json!({"title": "   "})), MAX)
            .await
            .unwrap();
        assert_eq!(payload.text("title"), None);
    }
}
