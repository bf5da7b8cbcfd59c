//! User aggregate and identifier.
//!
//! Users own password entries and documents. The aggregate carries the
//! bcrypt password hash and the optional avatar locator; neither is ever
//! serialised to clients directly (handlers build their own DTOs).

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::document::Locator;

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse from the canonical hyphenated form.
    pub fn parse(raw: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(raw).map(Self)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    /// Bcrypt hash of the account password. Opaque to the domain.
    pub password_hash: String,
    /// Locator of the current avatar blob, when one has been uploaded.
    pub avatar: Option<Locator>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable profile fields accepted by the update operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Validation error raised for malformed profile input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileValidationError {
    /// Email is empty or has no `@`.
    #[error("email must contain an @ and must not be empty")]
    InvalidEmail,
    /// Display name is empty after trimming.
    #[error("display name must not be empty")]
    EmptyDisplayName,
}

/// Validate an email address the way the record store expects it: trimmed,
/// non-empty, containing a single-level sanity `@` check. Full RFC parsing
/// is deliberately out of scope.
pub fn validate_email(raw: &str) -> Result<String, ProfileValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(ProfileValidationError::InvalidEmail);
    }
    Ok(trimmed.to_ascii_lowercase())
}

/// Validate a display name: trimmed and non-empty.
pub fn validate_display_name(raw: &str) -> Result<String, ProfileValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ProfileValidationError::EmptyDisplayName);
    }
    Ok(trimmed.to_owned())
}
