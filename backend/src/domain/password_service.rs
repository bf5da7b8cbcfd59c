//! Password entry use-cases.
//!
//! Implements the ownership-scoped CRUD lifecycle over a
//! [`PasswordEntryRepository`]. Authorisation is structural: the owner id
//! travels into every repository call and absent-vs-foreign records both
//! come back as not-found.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::DomainError;
use super::password_entry::{EntryDraft, PasswordEntry};
use super::ports::{PasswordEntryRepository, RepositoryError};
use super::user::UserId;

/// Driving port for password entry operations.
#[async_trait]
pub trait PasswordEntryOps: Send + Sync {
    /// All entries for the owner, newest first.
    async fn list(&self, owner: UserId) -> Result<Vec<PasswordEntry>, DomainError>;

    /// A single owned entry.
    async fn get(&self, id: Uuid, owner: UserId) -> Result<PasswordEntry, DomainError>;

    /// Validate and persist a new entry.
    async fn create(&self, owner: UserId, draft: EntryDraft) -> Result<PasswordEntry, DomainError>;

    /// Replace an owned entry's fields, re-validating them.
    async fn update(
        &self,
        id: Uuid,
        owner: UserId,
        draft: EntryDraft,
    ) -> Result<PasswordEntry, DomainError>;

    /// Remove an owned entry.
    async fn delete(&self, id: Uuid, owner: UserId) -> Result<(), DomainError>;
}

/// Map persistence failures into domain errors.
pub(crate) fn map_repository_error(error: RepositoryError) -> DomainError {
    match error {
        RepositoryError::Conflict { message } => DomainError::conflict(message),
        RepositoryError::Connection { message } | RepositoryError::Query { message } => {
            DomainError::internal(format!("persistence failure: {message}"))
        }
    }
}

fn entry_not_found() -> DomainError {
    DomainError::not_found("password entry not found")
}

/// Service implementing [`PasswordEntryOps`] over a repository.
#[derive(Clone)]
pub struct PasswordEntryService<R> {
    repo: Arc<R>,
}

impl<R> PasswordEntryService<R> {
    /// Create a new service over the given repository.
    pub const fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<R> PasswordEntryOps for PasswordEntryService<R>
where
    R: PasswordEntryRepository,
{
    async fn list(&self, owner: UserId) -> Result<Vec<PasswordEntry>, DomainError> {
        self.repo.list(owner).await.map_err(map_repository_error)
    }

    async fn get(&self, id: Uuid, owner: UserId) -> Result<PasswordEntry, DomainError> {
        self.repo
            .find(id, owner)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(entry_not_found)
    }

    async fn create(&self, owner: UserId, draft: EntryDraft) -> Result<PasswordEntry, DomainError> {
        let fields = draft.validate()?;
        let now = Utc::now();
        let entry = PasswordEntry {
            id: Uuid::new_v4(),
            owner_id: owner,
            title: fields.title,
            username: fields.username,
            secret: fields.secret,
            website: fields.website,
            category: fields.category,
            notes: fields.notes,
            created_at: now,
            updated_at: now,
        };
        self.repo
            .insert(&entry)
            .await
            .map_err(map_repository_error)?;
        Ok(entry)
    }

    async fn update(
        &self,
        id: Uuid,
        owner: UserId,
        draft: EntryDraft,
    ) -> Result<PasswordEntry, DomainError> {
        let fields = draft.validate()?;
        self.repo
            .update(id, owner, &fields)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(entry_not_found)
    }

    async fn delete(&self, id: Uuid, owner: UserId) -> Result<(), DomainError> {
        let removed = self
            .repo
            .delete(id, owner)
            .await
            .map_err(map_repository_error)?;
        if removed { Ok(()) } else { Err(entry_not_found()) }
    }
}
