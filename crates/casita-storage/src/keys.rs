//! Shared key generation for storage backends.
//!
//! Key format: `{unix_millis}-{random8}-{sanitized_filename}`.

use casita_core::sanitize_filename;
use chrono::Utc;
use uuid::Uuid;

/// Generate a collision-resistant storage key for an uploaded file.
///
/// Composes the current timestamp, an opaque random component, and the
/// sanitized original filename. Both backends must use this format.
pub fn generate_storage_key(original_name: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        &random[..8],
        sanitize_filename(original_name)
    )
}
