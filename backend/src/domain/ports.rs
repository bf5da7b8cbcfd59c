//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports describe how the domain reaches persistence, blob storage,
//! hashing, and token issuance. Driving ports are the use-case surfaces the
//! HTTP adapter consumes as `Arc<dyn Trait>`. Every trait exposes strongly
//! typed errors so adapters map their failures into predictable variants.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use super::document::{Document, Locator};
use super::password_entry::{PasswordEntry, ValidatedEntry};
use super::user::{User, UserId};

/// Errors surfaced by persistence adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Connection checkout or database connectivity failures.
    #[error("repository connection failed: {message}")]
    Connection { message: String },
    /// A uniqueness constraint was violated.
    #[error("repository conflict: {message}")]
    Conflict { message: String },
    /// Query or mutation failed during execution.
    #[error("repository query failed: {message}")]
    Query { message: String },
}

impl RepositoryError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for uniqueness conflicts.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Persistence port for password entries.
///
/// Every lookup predicate includes the owner: a record owned by someone
/// else is indistinguishable from an absent one at this boundary already.
#[async_trait]
pub trait PasswordEntryRepository: Send + Sync {
    /// All entries for the owner, newest first by creation time.
    async fn list(&self, owner: UserId) -> Result<Vec<PasswordEntry>, RepositoryError>;

    /// A single entry under `(id, owner)`.
    async fn find(&self, id: Uuid, owner: UserId)
    -> Result<Option<PasswordEntry>, RepositoryError>;

    /// Persist a new entry.
    async fn insert(&self, entry: &PasswordEntry) -> Result<(), RepositoryError>;

    /// Replace the mutable fields of an owned entry; `None` when the entry
    /// does not exist under that owner.
    async fn update(
        &self,
        id: Uuid,
        owner: UserId,
        fields: &ValidatedEntry,
    ) -> Result<Option<PasswordEntry>, RepositoryError>;

    /// Remove an owned entry, reporting whether a row was deleted.
    async fn delete(&self, id: Uuid, owner: UserId) -> Result<bool, RepositoryError>;
}

/// Persistence port for document metadata.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// All documents for the owner, newest first by creation time.
    async fn list(&self, owner: UserId) -> Result<Vec<Document>, RepositoryError>;

    /// A single document under `(id, owner)`.
    async fn find(&self, id: Uuid, owner: UserId) -> Result<Option<Document>, RepositoryError>;

    /// Persist a new metadata record.
    async fn insert(&self, document: &Document) -> Result<(), RepositoryError>;

    /// Remove an owned record, returning it so the caller can release the
    /// backing blob.
    async fn delete(&self, id: Uuid, owner: UserId) -> Result<Option<Document>, RepositoryError>;
}

/// Persistence port for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Fetch a user by normalised email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// Persist a new account. Duplicate emails surface as
    /// [`RepositoryError::Conflict`].
    async fn insert(&self, user: &User) -> Result<(), RepositoryError>;

    /// Update profile fields, returning the stored user or `None`.
    async fn update_profile(
        &self,
        id: UserId,
        email: &str,
        display_name: &str,
    ) -> Result<Option<User>, RepositoryError>;

    /// Replace the avatar locator (or clear it with `None`).
    async fn set_avatar(
        &self,
        id: UserId,
        avatar: Option<&Locator>,
    ) -> Result<Option<User>, RepositoryError>;

    /// Replace the stored password hash.
    async fn set_password_hash(&self, id: UserId, hash: &str) -> Result<bool, RepositoryError>;
}

/// Storage area a blob belongs to. Namespaces map to distinct prefixes so
/// avatar and document blobs never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlobNamespace {
    Avatars,
    Documents,
}

impl BlobNamespace {
    /// Prefix or folder name for the namespace.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Avatars => "avatars",
            Self::Documents => "documents",
        }
    }
}

/// Errors surfaced when writing or reading a blob. Deletion deliberately
/// has no error type; see [`BlobDeleteOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlobStoreError {
    /// The backend rejected or failed the write.
    #[error("blob store write failed: {message}")]
    Write { message: String },
    /// The locator resolved but the blob itself is gone. A record pointing
    /// at such a locator is a storage inconsistency.
    #[error("blob missing for locator {locator}")]
    Missing { locator: String },
    /// Reading the blob back failed for a reason other than absence.
    #[error("blob store read failed: {message}")]
    Read { message: String },
}

impl BlobStoreError {
    /// Helper for write failures.
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }

    /// Helper for read failures.
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }

    /// Helper for missing blobs.
    pub fn missing(locator: impl Into<String>) -> Self {
        Self::Missing {
            locator: locator.into(),
        }
    }
}

/// Result of a best-effort blob deletion. Never an error: callers must not
/// change behaviour when the backing blob cannot be removed, so failures
/// are logged inside the adapter and reported as [`Self::Skipped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobDeleteOutcome {
    /// The blob was removed.
    Deleted,
    /// No blob existed for the locator; idempotent success.
    Missing,
    /// The adapter could not delete (failure logged) or declined to
    /// (unparseable remote locator); the caller proceeds regardless.
    Skipped,
}

/// Where a locator resolves to for retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalTarget {
    /// Redirect the client to a remote URL (attachment hint included when
    /// the backend supports it).
    Redirect(Url),
    /// Stream bytes from a local file.
    LocalFile(PathBuf),
}

/// Uniform interface over blob storage, satisfied by the local filesystem
/// or a remote object store. Selected once at startup; call sites never
/// branch on configuration.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `bytes` under the namespace with the generated name and
    /// return the locator for the metadata record.
    async fn store(
        &self,
        bytes: Vec<u8>,
        namespace: BlobNamespace,
        name: &str,
    ) -> Result<Locator, BlobStoreError>;

    /// Best-effort, non-throwing delete.
    async fn delete(&self, locator: &Locator) -> BlobDeleteOutcome;

    /// Resolve the locator to a redirect URL or a local file reference.
    fn resolve(&self, locator: &Locator) -> RetrievalTarget;
}

/// Password hashing port (bcrypt behind the seam).
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password.
    fn hash(&self, plaintext: &str) -> Result<String, super::DomainError>;

    /// Verify a plaintext password against a stored hash.
    fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

/// Reasons token verification can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signature or claims are invalid.
    #[error("token is invalid")]
    Invalid,
    /// The token has expired.
    #[error("token has expired")]
    Expired,
}

/// Bearer-token issuance and verification port.
pub trait TokenService: Send + Sync {
    /// Issue a signed token for the user.
    fn issue(&self, user: UserId) -> Result<String, super::DomainError>;

    /// Verify a presented token and extract the owner id.
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}
