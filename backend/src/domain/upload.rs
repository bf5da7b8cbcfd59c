//! Upload validation policy and blob-name generation.
//!
//! Validation runs before any byte reaches the storage backend: a rejected
//! upload must leave no orphaned blob. Avatars are additionally restricted
//! to an image allow-list checked against BOTH the filename extension and
//! the declared content type.

use rand::Rng;
use serde_json::json;

use super::{DomainError, ErrorCode};

/// Default ceiling for avatar uploads (5 MiB).
pub const AVATAR_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Default ceiling for document uploads (50 MiB).
pub const DOCUMENT_MAX_BYTES: usize = 50 * 1024 * 1024;

/// Extensions accepted for avatar images.
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Content types accepted for avatar images.
const IMAGE_CONTENT_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Byte ceilings for the two upload kinds, configurable for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub avatar_max_bytes: usize,
    pub document_max_bytes: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            avatar_max_bytes: AVATAR_MAX_BYTES,
            document_max_bytes: DOCUMENT_MAX_BYTES,
        }
    }
}

/// A fully buffered upload handed to the domain by the multipart adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub original_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Lower-cased extension of the original filename, without the dot.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.original_name.rsplit_once('.')?;
        if ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Error for an upload that exceeds the configured ceiling.
pub fn too_large_error(max_bytes: usize) -> DomainError {
    DomainError::new(
        ErrorCode::InvalidRequest,
        format!("file exceeds the {max_bytes} byte limit"),
    )
    .with_details(json!({ "maxBytes": max_bytes }))
}

/// Error for a request that carried no file under the expected field.
pub fn no_file_error(field: &str) -> DomainError {
    DomainError::new(
        ErrorCode::InvalidRequest,
        format!("no file provided under field '{field}'"),
    )
    .with_details(json!({ "field": field }))
}

/// Enforce the avatar image allow-list.
///
/// Both the filename extension and the declared content type must match;
/// a `.png` name with a non-image content type is rejected, as is an image
/// content type with an unlisted extension.
pub fn require_image(file: &UploadedFile) -> Result<(), DomainError> {
    let extension_ok = file
        .extension()
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()));
    let declared = file
        .content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let content_type_ok = IMAGE_CONTENT_TYPES.contains(&declared.as_str());
    if extension_ok && content_type_ok {
        return Ok(());
    }
    Err(DomainError::invalid_request("only image files are allowed")
        .with_details(json!({
            "contentType": file.content_type,
            "fileName": file.original_name,
        })))
}

/// Derive a collision-free storage name: unix-millis timestamp plus a
/// random hex component, keeping the original extension. No transaction is
/// needed because two uploads landing in the same millisecond still differ
/// in the random component.
#[must_use]
pub fn generate_blob_name(original_name: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let noise: u32 = rand::thread_rng().r#gen();
    let base = format!("{millis}-{noise:08x}");
    match original_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!("{base}.{}", ext.to_ascii_lowercase()),
        _ => base,
    }
}
