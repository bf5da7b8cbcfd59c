//! Row types mapping the schema onto the domain entities.

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{documents, password_entries, users};
use crate::domain::ports::RepositoryError;
use crate::domain::{Category, Document, Locator, PasswordEntry, User, UserId};

fn parse_id(column: &str, value: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(value)
        .map_err(|err| RepositoryError::query(format!("corrupt {column} '{value}': {err}")))
}

fn to_utc(stamp: NaiveDateTime) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(stamp, Utc)
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct UserRow {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl UserRow {
    pub(crate) fn into_domain(self) -> Result<User, RepositoryError> {
        Ok(User {
            id: UserId::from_uuid(parse_id("users.id", &self.id)?),
            email: self.email,
            display_name: self.display_name,
            password_hash: self.password_hash,
            avatar: self.avatar.map(Locator::new),
            created_at: to_utc(self.created_at),
            updated_at: to_utc(self.updated_at),
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: String,
    pub email: &'a str,
    pub display_name: &'a str,
    pub password_hash: &'a str,
    pub avatar: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewUserRow<'a> {
    pub(crate) fn from_domain(user: &'a User) -> Self {
        Self {
            id: user.id.to_string(),
            email: &user.email,
            display_name: &user.display_name,
            password_hash: &user.password_hash,
            avatar: user.avatar.as_ref().map(Locator::as_str),
            created_at: user.created_at.naive_utc(),
            updated_at: user.updated_at.naive_utc(),
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = password_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct PasswordEntryRow {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub username: Option<String>,
    pub secret: String,
    pub website: Option<String>,
    pub category: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl PasswordEntryRow {
    pub(crate) fn into_domain(self) -> Result<PasswordEntry, RepositoryError> {
        Ok(PasswordEntry {
            id: parse_id("password_entries.id", &self.id)?,
            owner_id: UserId::from_uuid(parse_id("password_entries.owner_id", &self.owner_id)?),
            title: self.title,
            username: self.username,
            secret: self.secret,
            website: self.website,
            category: Category::parse_or_default(Some(&self.category)),
            notes: self.notes,
            created_at: to_utc(self.created_at),
            updated_at: to_utc(self.updated_at),
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = password_entries)]
pub(crate) struct NewPasswordEntryRow<'a> {
    pub id: String,
    pub owner_id: String,
    pub title: &'a str,
    pub username: Option<&'a str>,
    pub secret: &'a str,
    pub website: Option<&'a str>,
    pub category: &'a str,
    pub notes: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewPasswordEntryRow<'a> {
    pub(crate) fn from_domain(entry: &'a PasswordEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            owner_id: entry.owner_id.to_string(),
            title: &entry.title,
            username: entry.username.as_deref(),
            secret: &entry.secret,
            website: entry.website.as_deref(),
            category: entry.category.as_str(),
            notes: entry.notes.as_deref(),
            created_at: entry.created_at.naive_utc(),
            updated_at: entry.updated_at.naive_utc(),
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct DocumentRow {
    pub id: String,
    pub owner_id: String,
    pub stored_name: String,
    pub original_name: String,
    pub locator: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: NaiveDateTime,
}

impl DocumentRow {
    pub(crate) fn into_domain(self) -> Result<Document, RepositoryError> {
        Ok(Document {
            id: parse_id("documents.id", &self.id)?,
            owner_id: UserId::from_uuid(parse_id("documents.owner_id", &self.owner_id)?),
            stored_name: self.stored_name,
            original_name: self.original_name,
            locator: Locator::new(self.locator),
            content_type: self.content_type,
            size_bytes: self.size_bytes,
            created_at: to_utc(self.created_at),
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
pub(crate) struct NewDocumentRow<'a> {
    pub id: String,
    pub owner_id: String,
    pub stored_name: &'a str,
    pub original_name: &'a str,
    pub locator: &'a str,
    pub content_type: &'a str,
    pub size_bytes: i64,
    pub created_at: NaiveDateTime,
}

impl<'a> NewDocumentRow<'a> {
    pub(crate) fn from_domain(document: &'a Document) -> Self {
        Self {
            id: document.id.to_string(),
            owner_id: document.owner_id.to_string(),
            stored_name: &document.stored_name,
            original_name: &document.original_name,
            locator: document.locator.as_str(),
            content_type: &document.content_type,
            size_bytes: document.size_bytes,
            created_at: document.created_at.naive_utc(),
        }
    }
}
