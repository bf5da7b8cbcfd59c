//! Password entry aggregate and validation.
//!
//! Entries are ownership scoped: `owner_id` is fixed at creation and every
//! repository lookup filters on it. The secret is stored as an opaque
//! string; no hashing or encryption is applied at this layer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserId;
use super::{DomainError, ErrorCode};

/// Fixed set of entry categories.
///
/// Unrecognised or absent input falls back to [`Category::Other`] rather
/// than failing validation; the category is advisory, not structural.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Social,
    Email,
    Banking,
    Shopping,
    Work,
    #[default]
    Other,
}

impl Category {
    /// Parse a category, defaulting to [`Category::Other`] for absent or
    /// unrecognised values.
    #[must_use]
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        raw.and_then(|value| Self::from_str(value).ok())
            .unwrap_or_default()
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Social => "social",
            Self::Email => "email",
            Self::Banking => "banking",
            Self::Shopping => "shopping",
            Self::Work => "work",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "social" => Ok(Self::Social),
            "email" => Ok(Self::Email),
            "banking" => Ok(Self::Banking),
            "shopping" => Ok(Self::Shopping),
            "work" => Ok(Self::Work),
            "other" => Ok(Self::Other),
            _ => Err(()),
        }
    }
}

/// A stored password entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordEntry {
    pub id: Uuid,
    pub owner_id: UserId,
    pub title: String,
    pub username: Option<String>,
    pub secret: String,
    pub website: Option<String>,
    pub category: Category,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated entry fields as received from an adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub title: Option<String>,
    pub username: Option<String>,
    pub secret: Option<String>,
    pub website: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

/// Validated fields ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEntry {
    pub title: String,
    pub username: Option<String>,
    pub secret: String,
    pub website: Option<String>,
    pub category: Category,
    pub notes: Option<String>,
}

fn missing_field(field: &str) -> DomainError {
    DomainError::new(ErrorCode::InvalidRequest, format!("{field} is required"))
        .with_details(json!({ "field": field }))
}

fn required(value: Option<String>, field: &str) -> Result<String, DomainError> {
    match value {
        Some(raw) if !raw.trim().is_empty() => Ok(raw),
        _ => Err(missing_field(field)),
    }
}

impl EntryDraft {
    /// Validate required fields and normalise the category.
    ///
    /// `title` and `secret` must be present and non-blank; everything else
    /// is optional, with the category defaulting to `other`.
    pub fn validate(self) -> Result<ValidatedEntry, DomainError> {
        let title = required(self.title, "title")?;
        let secret = required(self.secret, "secret")?;
        Ok(ValidatedEntry {
            title,
            username: self.username,
            secret,
            website: self.website,
            category: Category::parse_or_default(self.category.as_deref()),
            notes: self.notes,
        })
    }
}
