//! Filesystem blob store.
//!
//! Blobs live under a root uploads directory with one subdirectory per
//! namespace. Locators are relative paths (`uploads/avatars/...`) so the
//! same root can be mounted statically by the HTTP server.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;

use crate::domain::Locator;
use crate::domain::ports::{
    BlobDeleteOutcome, BlobNamespace, BlobStore, BlobStoreError, RetrievalTarget,
};

/// Prefix under which local locators are expressed and served.
pub const LOCAL_LOCATOR_PREFIX: &str = "uploads";

/// Blob store writing to the local filesystem.
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create the store and its namespace subdirectories under `root`.
    pub async fn create(root: impl Into<PathBuf>) -> Result<Self, std::io::Error> {
        let root = root.into();
        for namespace in [BlobNamespace::Avatars, BlobNamespace::Documents] {
            tokio::fs::create_dir_all(root.join(namespace.as_str())).await?;
        }
        Ok(Self { root })
    }

    /// Root directory the store writes beneath.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, locator: &Locator) -> PathBuf {
        let raw = locator.as_str();
        let relative = raw
            .strip_prefix(LOCAL_LOCATOR_PREFIX)
            .map_or(raw, |rest| rest.trim_start_matches('/'));
        self.root.join(relative)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn store(
        &self,
        bytes: Vec<u8>,
        namespace: BlobNamespace,
        name: &str,
    ) -> Result<Locator, BlobStoreError> {
        let path = self.root.join(namespace.as_str()).join(name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|err| BlobStoreError::write(format!("{}: {err}", path.display())))?;
        Ok(Locator::new(format!(
            "{LOCAL_LOCATOR_PREFIX}/{}/{name}",
            namespace.as_str()
        )))
    }

    async fn delete(&self, locator: &Locator) -> BlobDeleteOutcome {
        if locator.is_remote() {
            // Written under a remote backend; this store has no way to
            // reach it. Metadata deletion proceeds regardless.
            warn!(locator = locator.as_str(), "remote locator under local store, skipping delete");
            return BlobDeleteOutcome::Skipped;
        }
        super::remove_blob_file(&self.path_for(locator)).await
    }

    fn resolve(&self, locator: &Locator) -> RetrievalTarget {
        if locator.is_remote() {
            if let Some(url) = super::attachment_redirect(locator.as_str()) {
                return RetrievalTarget::Redirect(url);
            }
            warn!(locator = locator.as_str(), "remote locator does not parse as a URL");
        }
        RetrievalTarget::LocalFile(self.path_for(locator))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[actix_rt::test]
    async fn stores_and_resolves_under_the_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::create(dir.path()).await.unwrap();

        let locator = store
            .store(b"pdf bytes".to_vec(), BlobNamespace::Documents, "1-abc.pdf")
            .await
            .unwrap();
        assert_eq!(locator.as_str(), "uploads/documents/1-abc.pdf");
        assert!(!locator.is_remote());

        let RetrievalTarget::LocalFile(path) = store.resolve(&locator) else {
            panic!("local locator must resolve to a file");
        };
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"pdf bytes");
    }

    #[rstest]
    #[actix_rt::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::create(dir.path()).await.unwrap();
        let locator = store
            .store(vec![0u8; 4], BlobNamespace::Avatars, "1-face.png")
            .await
            .unwrap();

        assert_eq!(store.delete(&locator).await, BlobDeleteOutcome::Deleted);
        assert_eq!(store.delete(&locator).await, BlobDeleteOutcome::Missing);
    }

    #[rstest]
    #[actix_rt::test]
    async fn remote_locator_redirects_instead_of_hitting_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::create(dir.path()).await.unwrap();
        let locator = Locator::new("https://blobs.example/acme/upload/v1/docs/1-abc.pdf");

        let RetrievalTarget::Redirect(url) = store.resolve(&locator) else {
            panic!("remote locator must redirect");
        };
        assert_eq!(
            url.as_str(),
            "https://blobs.example/acme/upload/v1/docs/1-abc.pdf?attachment=true"
        );
        assert_eq!(store.delete(&locator).await, BlobDeleteOutcome::Skipped);
    }
}
