//! Profile use-cases: profile fields, avatar lifecycle, password change.
//!
//! Avatar replacement follows the upload-pipeline ordering: store the new
//! blob, point the account at it, then attempt removal of the previous
//! blob. That last step is best-effort and never alters the response.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::DomainError;
use super::password_service::map_repository_error;
use super::ports::{BlobNamespace, BlobStore, PasswordHasher, UserRepository};
use super::upload::{UploadedFile, generate_blob_name, require_image, too_large_error};
use super::user::{ProfileUpdate, User, UserId, validate_display_name, validate_email};

/// Driving port for account profile operations.
#[async_trait]
pub trait ProfileOps: Send + Sync {
    /// The authenticated user's account.
    async fn get(&self, owner: UserId) -> Result<User, DomainError>;

    /// Update profile fields, leaving absent ones untouched.
    async fn update(&self, owner: UserId, update: ProfileUpdate) -> Result<User, DomainError>;

    /// Store a new avatar, replacing (and best-effort deleting) any
    /// previous one.
    async fn set_avatar(&self, owner: UserId, file: UploadedFile) -> Result<User, DomainError>;

    /// Clear the avatar, best-effort deleting the backing blob.
    async fn delete_avatar(&self, owner: UserId) -> Result<User, DomainError>;

    /// Replace the account password after verifying the current one.
    async fn change_password(
        &self,
        owner: UserId,
        current: &str,
        replacement: &str,
    ) -> Result<(), DomainError>;
}

fn account_not_found() -> DomainError {
    DomainError::not_found("account not found")
}

/// Service implementing [`ProfileOps`].
#[derive(Clone)]
pub struct ProfileService<U> {
    users: Arc<U>,
    blobs: Arc<dyn BlobStore>,
    hasher: Arc<dyn PasswordHasher>,
    avatar_max_bytes: usize,
}

impl<U> ProfileService<U> {
    /// Create a new service over the user repository and blob store.
    pub fn new(
        users: Arc<U>,
        blobs: Arc<dyn BlobStore>,
        hasher: Arc<dyn PasswordHasher>,
        avatar_max_bytes: usize,
    ) -> Self {
        Self {
            users,
            blobs,
            hasher,
            avatar_max_bytes,
        }
    }
}

impl<U> ProfileService<U>
where
    U: UserRepository,
{
    async fn require_user(&self, owner: UserId) -> Result<User, DomainError> {
        self.users
            .find_by_id(owner)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(account_not_found)
    }

    async fn discard_blob(&self, locator: &super::document::Locator) {
        if let super::ports::BlobDeleteOutcome::Skipped = self.blobs.delete(locator).await {
            warn!(%locator, "previous avatar blob could not be removed");
        }
    }
}

#[async_trait]
impl<U> ProfileOps for ProfileService<U>
where
    U: UserRepository,
{
    async fn get(&self, owner: UserId) -> Result<User, DomainError> {
        self.require_user(owner).await
    }

    async fn update(&self, owner: UserId, update: ProfileUpdate) -> Result<User, DomainError> {
        let current = self.require_user(owner).await?;
        let email = match update.email {
            Some(raw) => validate_email(&raw)
                .map_err(|err| DomainError::invalid_request(err.to_string()))?,
            None => current.email,
        };
        let display_name = match update.display_name {
            Some(raw) => validate_display_name(&raw)
                .map_err(|err| DomainError::invalid_request(err.to_string()))?,
            None => current.display_name,
        };
        self.users
            .update_profile(owner, &email, &display_name)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(account_not_found)
    }

    async fn set_avatar(&self, owner: UserId, file: UploadedFile) -> Result<User, DomainError> {
        if file.bytes.len() > self.avatar_max_bytes {
            return Err(too_large_error(self.avatar_max_bytes));
        }
        require_image(&file)?;
        let previous = self.require_user(owner).await?.avatar;

        let name = generate_blob_name(&file.original_name);
        let locator = self
            .blobs
            .store(file.bytes, BlobNamespace::Avatars, &name)
            .await
            .map_err(|err| DomainError::internal(format!("blob storage failed: {err}")))?;
        let user = self
            .users
            .set_avatar(owner, Some(&locator))
            .await
            .map_err(map_repository_error)?
            .ok_or_else(account_not_found)?;

        if let Some(old) = previous {
            self.discard_blob(&old).await;
        }
        Ok(user)
    }

    async fn delete_avatar(&self, owner: UserId) -> Result<User, DomainError> {
        let previous = self.require_user(owner).await?.avatar;
        let user = self
            .users
            .set_avatar(owner, None)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(account_not_found)?;
        if let Some(old) = previous {
            self.discard_blob(&old).await;
        }
        Ok(user)
    }

    async fn change_password(
        &self,
        owner: UserId,
        current: &str,
        replacement: &str,
    ) -> Result<(), DomainError> {
        if replacement.trim().is_empty() {
            return Err(DomainError::invalid_request("new password must not be empty"));
        }
        let user = self.require_user(owner).await?;
        if !self.hasher.verify(current, &user.password_hash) {
            return Err(DomainError::invalid_request("current password is incorrect"));
        }
        let hash = self.hasher.hash(replacement)?;
        let updated = self
            .users
            .set_password_hash(owner, &hash)
            .await
            .map_err(map_repository_error)?;
        if updated { Ok(()) } else { Err(account_not_found()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::document::Locator;
    use crate::domain::ports::{
        BlobDeleteOutcome, BlobStoreError, RepositoryError, RetrievalTarget,
    };
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryUsers {
        rows: Mutex<Vec<User>>,
    }

    impl InMemoryUsers {
        fn with_user(user: User) -> Self {
            Self {
                rows: Mutex::new(vec![user]),
            }
        }
    }

    #[async_trait]
    impl UserRepository for InMemoryUsers {
        async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
            let rows = self.rows.lock().expect("rows poisoned");
            Ok(rows.iter().find(|row| row.id == id).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
            let rows = self.rows.lock().expect("rows poisoned");
            Ok(rows.iter().find(|row| row.email == email).cloned())
        }

        async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
            let mut rows = self.rows.lock().expect("rows poisoned");
            if rows.iter().any(|row| row.email == user.email) {
                return Err(RepositoryError::conflict("email already registered"));
            }
            rows.push(user.clone());
            Ok(())
        }

        async fn update_profile(
            &self,
            id: UserId,
            email: &str,
            display_name: &str,
        ) -> Result<Option<User>, RepositoryError> {
            let mut rows = self.rows.lock().expect("rows poisoned");
            let Some(row) = rows.iter_mut().find(|row| row.id == id) else {
                return Ok(None);
            };
            row.email = email.to_owned();
            row.display_name = display_name.to_owned();
            row.updated_at = Utc::now();
            Ok(Some(row.clone()))
        }

        async fn set_avatar(
            &self,
            id: UserId,
            avatar: Option<&Locator>,
        ) -> Result<Option<User>, RepositoryError> {
            let mut rows = self.rows.lock().expect("rows poisoned");
            let Some(row) = rows.iter_mut().find(|row| row.id == id) else {
                return Ok(None);
            };
            row.avatar = avatar.cloned();
            Ok(Some(row.clone()))
        }

        async fn set_password_hash(
            &self,
            id: UserId,
            hash: &str,
        ) -> Result<bool, RepositoryError> {
            let mut rows = self.rows.lock().expect("rows poisoned");
            let Some(row) = rows.iter_mut().find(|row| row.id == id) else {
                return Ok(false);
            };
            row.password_hash = hash.to_owned();
            Ok(true)
        }
    }

    #[derive(Default)]
    struct RecordingBlobs {
        stored: Mutex<Vec<String>>,
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BlobStore for RecordingBlobs {
        async fn store(
            &self,
            _bytes: Vec<u8>,
            namespace: BlobNamespace,
            name: &str,
        ) -> Result<Locator, BlobStoreError> {
            let relative = format!("{}/{name}", namespace.as_str());
            self.stored
                .lock()
                .expect("stored poisoned")
                .push(relative.clone());
            Ok(Locator::new(relative))
        }

        async fn delete(&self, locator: &Locator) -> BlobDeleteOutcome {
            self.deleted
                .lock()
                .expect("deleted poisoned")
                .push(locator.as_str().to_owned());
            BlobDeleteOutcome::Deleted
        }

        fn resolve(&self, locator: &Locator) -> RetrievalTarget {
            RetrievalTarget::LocalFile(locator.as_str().into())
        }
    }

    /// Transparent hasher so tests can assert on the stored value.
    struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, plaintext: &str) -> Result<String, DomainError> {
            Ok(format!("hash:{plaintext}"))
        }

        fn verify(&self, plaintext: &str, hash: &str) -> bool {
            hash == format!("hash:{plaintext}")
        }
    }

    fn user() -> User {
        let now = Utc::now();
        User {
            id: UserId::random(),
            email: "ada@example.com".into(),
            display_name: "Ada".into(),
            password_hash: "hash:letmein".into(),
            avatar: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(
        repo: InMemoryUsers,
        blobs: Arc<RecordingBlobs>,
    ) -> ProfileService<InMemoryUsers> {
        ProfileService::new(Arc::new(repo), blobs, Arc::new(PlainHasher), 64)
    }

    fn png(bytes: usize) -> UploadedFile {
        UploadedFile {
            original_name: "me.png".into(),
            content_type: "image/png".into(),
            bytes: vec![0u8; bytes],
        }
    }

    #[tokio::test]
    async fn avatar_replacement_deletes_the_previous_blob() {
        let account = user();
        let owner = account.id;
        let blobs = Arc::new(RecordingBlobs::default());
        let svc = service(InMemoryUsers::with_user(account), Arc::clone(&blobs));

        let first = svc.set_avatar(owner, png(8)).await.expect("first avatar");
        let first_locator = first.avatar.clone().expect("avatar set");
        assert!(blobs.deleted.lock().expect("deleted").is_empty());

        let second = svc.set_avatar(owner, png(8)).await.expect("second avatar");
        let second_locator = second.avatar.expect("avatar replaced");
        assert_ne!(first_locator, second_locator);
        assert_eq!(
            blobs.deleted.lock().expect("deleted").as_slice(),
            [first_locator.as_str().to_owned()]
        );
    }

    #[tokio::test]
    async fn avatar_dual_check_rejects_mismatched_content_type() {
        let account = user();
        let owner = account.id;
        let blobs = Arc::new(RecordingBlobs::default());
        let svc = service(InMemoryUsers::with_user(account), Arc::clone(&blobs));

        let mut file = png(8);
        file.content_type = "application/octet-stream".into();
        let err = svc.set_avatar(owner, file).await.expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert!(blobs.stored.lock().expect("stored").is_empty());
    }

    #[tokio::test]
    async fn oversize_avatar_is_rejected_before_storage() {
        let account = user();
        let owner = account.id;
        let blobs = Arc::new(RecordingBlobs::default());
        let svc = service(InMemoryUsers::with_user(account), Arc::clone(&blobs));

        let err = svc
            .set_avatar(owner, png(65))
            .await
            .expect_err("over the avatar ceiling");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert!(blobs.stored.lock().expect("stored").is_empty());
    }

    #[tokio::test]
    async fn delete_avatar_clears_the_locator() {
        let account = user();
        let owner = account.id;
        let blobs = Arc::new(RecordingBlobs::default());
        let svc = service(InMemoryUsers::with_user(account), Arc::clone(&blobs));

        svc.set_avatar(owner, png(8)).await.expect("avatar set");
        let cleared = svc.delete_avatar(owner).await.expect("cleared");
        assert!(cleared.avatar.is_none());
        assert_eq!(blobs.deleted.lock().expect("deleted").len(), 1);
    }

    #[tokio::test]
    async fn change_password_requires_the_current_one() {
        let account = user();
        let owner = account.id;
        let svc = service(
            InMemoryUsers::with_user(account),
            Arc::new(RecordingBlobs::default()),
        );

        let err = svc
            .change_password(owner, "wrong", "new-secret")
            .await
            .expect_err("wrong current password");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);

        svc.change_password(owner, "letmein", "new-secret")
            .await
            .expect("password changed");
        let stored = svc.get(owner).await.expect("user");
        assert_eq!(stored.password_hash, "hash:new-secret");
    }

    #[tokio::test]
    async fn profile_update_keeps_absent_fields() {
        let account = user();
        let owner = account.id;
        let svc = service(
            InMemoryUsers::with_user(account),
            Arc::new(RecordingBlobs::default()),
        );

        let updated = svc
            .update(
                owner,
                ProfileUpdate {
                    email: None,
                    display_name: Some("Countess".into()),
                },
            )
            .await
            .expect("updated");
        assert_eq!(updated.email, "ada@example.com");
        assert_eq!(updated.display_name, "Countess");
    }
}
