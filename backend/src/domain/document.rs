//! Document metadata and the blob locator.
//!
//! A [`Locator`] is the opaque reference a metadata record keeps to its
//! backing blob. Remote locators are absolute URLs; local locators are
//! relative paths beneath the uploads root. The discriminating rule is a
//! URL-scheme prefix check, and every downstream branch (delete, download,
//! redirect) keys off it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserId;

/// Opaque reference to a stored blob. Write-once on the owning record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    /// Wrap a raw locator string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// True when the locator points at a remote object store.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.0.starts_with("http")
    }

    /// Borrow the raw locator value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Locator {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Metadata record for an uploaded document.
///
/// The blob itself lives behind the storage backend; this record only keeps
/// the locator, storage name, and display metadata. `owner_id` and
/// `locator` are immutable after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub owner_id: UserId,
    /// Generated collision-free name the blob was stored under.
    pub stored_name: String,
    /// Name the client uploaded the file as; used for download filenames.
    pub original_name: String,
    pub locator: Locator,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}
