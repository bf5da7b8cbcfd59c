//! Document use-cases: upload pipeline, retrieval resolution, deletion.
//!
//! Ordering inside an upload is fixed: validate, persist the blob, then
//! write the metadata record. The two writes are not transactional — if the
//! metadata insert fails the blob is orphaned; the locator is logged so an
//! operator can reconcile, and the client sees a 500.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, warn};
use url::Url;
use uuid::Uuid;

use super::DomainError;
use super::document::Document;
use super::password_service::map_repository_error;
use super::ports::{BlobNamespace, BlobStore, DocumentRepository, RetrievalTarget};
use super::upload::{UploadedFile, generate_blob_name, too_large_error};
use super::user::UserId;

/// Resolved download for a stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentDownload {
    /// Client should follow a redirect to the remote store.
    Redirect(Url),
    /// Bytes are served from local storage.
    File {
        path: PathBuf,
        content_type: String,
        original_name: String,
    },
}

/// Driving port for document operations.
#[async_trait]
pub trait DocumentOps: Send + Sync {
    /// All documents for the owner, newest first.
    async fn list(&self, owner: UserId) -> Result<Vec<Document>, DomainError>;

    /// A single owned document's metadata.
    async fn get(&self, id: Uuid, owner: UserId) -> Result<Document, DomainError>;

    /// Validate, store the blob, and record metadata.
    async fn upload(&self, owner: UserId, file: UploadedFile) -> Result<Document, DomainError>;

    /// Resolve an owned document for download.
    async fn download(&self, id: Uuid, owner: UserId) -> Result<DocumentDownload, DomainError>;

    /// Remove metadata and best-effort delete the backing blob.
    async fn delete(&self, id: Uuid, owner: UserId) -> Result<(), DomainError>;
}

fn document_not_found() -> DomainError {
    DomainError::not_found("document not found")
}

/// Service implementing [`DocumentOps`].
#[derive(Clone)]
pub struct DocumentService<R> {
    repo: Arc<R>,
    blobs: Arc<dyn BlobStore>,
    max_bytes: usize,
}

impl<R> DocumentService<R> {
    /// Create a new service over a metadata repository and a blob store.
    pub fn new(repo: Arc<R>, blobs: Arc<dyn BlobStore>, max_bytes: usize) -> Self {
        Self {
            repo,
            blobs,
            max_bytes,
        }
    }
}

#[async_trait]
impl<R> DocumentOps for DocumentService<R>
where
    R: DocumentRepository,
{
    async fn list(&self, owner: UserId) -> Result<Vec<Document>, DomainError> {
        self.repo.list(owner).await.map_err(map_repository_error)
    }

    async fn get(&self, id: Uuid, owner: UserId) -> Result<Document, DomainError> {
        self.repo
            .find(id, owner)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(document_not_found)
    }

    async fn upload(&self, owner: UserId, file: UploadedFile) -> Result<Document, DomainError> {
        // The ceiling is enforced again here so no code path can reach the
        // blob store with an oversize payload.
        if file.bytes.len() > self.max_bytes {
            return Err(too_large_error(self.max_bytes));
        }

        let stored_name = generate_blob_name(&file.original_name);
        let size_bytes = i64::try_from(file.bytes.len())
            .map_err(|_| too_large_error(self.max_bytes))?;
        let locator = self
            .blobs
            .store(file.bytes, BlobNamespace::Documents, &stored_name)
            .await
            .map_err(|err| DomainError::internal(format!("blob storage failed: {err}")))?;

        let document = Document {
            id: Uuid::new_v4(),
            owner_id: owner,
            stored_name,
            original_name: file.original_name,
            locator,
            content_type: file.content_type,
            size_bytes,
            created_at: Utc::now(),
        };
        if let Err(err) = self.repo.insert(&document).await {
            // Accepted gap: the blob is now orphaned. Log the locator so the
            // leak can be reconciled manually.
            error!(
                locator = %document.locator,
                error = %err,
                "document metadata insert failed after blob write; blob orphaned"
            );
            return Err(map_repository_error(err));
        }
        Ok(document)
    }

    async fn download(&self, id: Uuid, owner: UserId) -> Result<DocumentDownload, DomainError> {
        let document = self.get(id, owner).await?;
        match self.blobs.resolve(&document.locator) {
            RetrievalTarget::Redirect(url) => Ok(DocumentDownload::Redirect(url)),
            RetrievalTarget::LocalFile(path) => {
                let present = tokio::fs::try_exists(&path).await.unwrap_or(false);
                if !present {
                    // Record exists, blob does not: a consistency violation
                    // distinct from record-not-found, flagged here.
                    error!(
                        document_id = %document.id,
                        locator = %document.locator,
                        "stored blob missing for existing document record"
                    );
                    return Err(DomainError::not_found("document file not found"));
                }
                Ok(DocumentDownload::File {
                    path,
                    content_type: document.content_type,
                    original_name: document.original_name,
                })
            }
        }
    }

    async fn delete(&self, id: Uuid, owner: UserId) -> Result<(), DomainError> {
        let Some(document) = self
            .repo
            .delete(id, owner)
            .await
            .map_err(map_repository_error)?
        else {
            return Err(document_not_found());
        };
        let outcome = self.blobs.delete(&document.locator).await;
        match outcome {
            super::ports::BlobDeleteOutcome::Skipped => warn!(
                locator = %document.locator,
                "backing blob could not be removed; metadata deleted anyway"
            ),
            other => debug!(locator = %document.locator, ?other, "blob delete outcome"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::document::Locator;
    use crate::domain::ports::{BlobDeleteOutcome, BlobStoreError, RepositoryError};
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryDocuments {
        rows: Mutex<Vec<Document>>,
        fail_insert: bool,
    }

    #[async_trait]
    impl DocumentRepository for InMemoryDocuments {
        async fn list(&self, owner: UserId) -> Result<Vec<Document>, RepositoryError> {
            let rows = self.rows.lock().expect("rows poisoned");
            Ok(rows
                .iter()
                .rev()
                .filter(|row| row.owner_id == owner)
                .cloned()
                .collect())
        }

        async fn find(&self, id: Uuid, owner: UserId) -> Result<Option<Document>, RepositoryError> {
            let rows = self.rows.lock().expect("rows poisoned");
            Ok(rows
                .iter()
                .find(|row| row.id == id && row.owner_id == owner)
                .cloned())
        }

        async fn insert(&self, document: &Document) -> Result<(), RepositoryError> {
            if self.fail_insert {
                return Err(RepositoryError::query("insert refused"));
            }
            self.rows
                .lock()
                .expect("rows poisoned")
                .push(document.clone());
            Ok(())
        }

        async fn delete(
            &self,
            id: Uuid,
            owner: UserId,
        ) -> Result<Option<Document>, RepositoryError> {
            let mut rows = self.rows.lock().expect("rows poisoned");
            let position = rows
                .iter()
                .position(|row| row.id == id && row.owner_id == owner);
            Ok(position.map(|index| rows.remove(index)))
        }
    }

    /// Records stores and deletes; resolves everything as a local file
    /// under `root`.
    struct RecordingBlobs {
        root: PathBuf,
        stored: Mutex<Vec<String>>,
        deleted: Mutex<Vec<String>>,
        delete_outcome: BlobDeleteOutcome,
    }

    impl RecordingBlobs {
        fn new(root: PathBuf) -> Self {
            Self {
                root,
                stored: Mutex::new(Vec::new()),
                deleted: Mutex::new(Vec::new()),
                delete_outcome: BlobDeleteOutcome::Deleted,
            }
        }

        fn store_count(&self) -> usize {
            self.stored.lock().expect("stored poisoned").len()
        }
    }

    #[async_trait]
    impl BlobStore for RecordingBlobs {
        async fn store(
            &self,
            bytes: Vec<u8>,
            namespace: BlobNamespace,
            name: &str,
        ) -> Result<Locator, BlobStoreError> {
            let relative = format!("{}/{name}", namespace.as_str());
            tokio::fs::create_dir_all(self.root.join(namespace.as_str()))
                .await
                .map_err(|err| BlobStoreError::write(err.to_string()))?;
            tokio::fs::write(self.root.join(&relative), bytes)
                .await
                .map_err(|err| BlobStoreError::write(err.to_string()))?;
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
            self.delete_outcome
        }

        fn resolve(&self, locator: &Locator) -> RetrievalTarget {
            RetrievalTarget::LocalFile(self.root.join(locator.as_str()))
        }
    }

    fn pdf(bytes: usize) -> UploadedFile {
        UploadedFile {
            original_name: "statement.pdf".into(),
            content_type: "application/pdf".into(),
            bytes: vec![0u8; bytes],
        }
    }

    fn service_with(
        repo: InMemoryDocuments,
        blobs: Arc<RecordingBlobs>,
        max_bytes: usize,
    ) -> DocumentService<InMemoryDocuments> {
        DocumentService::new(Arc::new(repo), blobs, max_bytes)
    }

    #[tokio::test]
    async fn oversize_upload_never_reaches_the_blob_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blobs = Arc::new(RecordingBlobs::new(dir.path().to_owned()));
        let svc = service_with(InMemoryDocuments::default(), Arc::clone(&blobs), 16);

        let err = svc
            .upload(UserId::random(), pdf(17))
            .await
            .expect_err("over the ceiling");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert!(err.message().contains("16"));
        assert_eq!(blobs.store_count(), 0);
        assert!(svc.list(UserId::random()).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn upload_stores_blob_then_metadata() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blobs = Arc::new(RecordingBlobs::new(dir.path().to_owned()));
        let svc = service_with(InMemoryDocuments::default(), Arc::clone(&blobs), 1024);
        let owner = UserId::random();

        let document = svc.upload(owner, pdf(10)).await.expect("uploaded");
        assert_eq!(document.original_name, "statement.pdf");
        assert_eq!(document.size_bytes, 10);
        assert!(document.stored_name.ends_with(".pdf"));
        assert!(document.locator.as_str().starts_with("documents/"));
        assert_eq!(blobs.store_count(), 1);

        let listed = svc.list(owner).await.expect("listed");
        assert_eq!(listed, vec![document]);
    }

    #[tokio::test]
    async fn metadata_failure_after_blob_write_is_internal_and_leaves_orphan() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blobs = Arc::new(RecordingBlobs::new(dir.path().to_owned()));
        let repo = InMemoryDocuments {
            fail_insert: true,
            ..InMemoryDocuments::default()
        };
        let svc = service_with(repo, Arc::clone(&blobs), 1024);

        let err = svc
            .upload(UserId::random(), pdf(10))
            .await
            .expect_err("insert refused");
        assert_eq!(err.code(), ErrorCode::InternalError);
        // The blob write happened before the failure; the orphan is accepted.
        assert_eq!(blobs.store_count(), 1);
    }

    #[tokio::test]
    async fn download_streams_existing_local_blob() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blobs = Arc::new(RecordingBlobs::new(dir.path().to_owned()));
        let svc = service_with(InMemoryDocuments::default(), Arc::clone(&blobs), 1024);
        let owner = UserId::random();

        let document = svc.upload(owner, pdf(10)).await.expect("uploaded");
        let download = svc.download(document.id, owner).await.expect("resolved");
        match download {
            DocumentDownload::File {
                path,
                content_type,
                original_name,
            } => {
                assert!(path.ends_with(document.locator.as_str()));
                assert_eq!(content_type, "application/pdf");
                assert_eq!(original_name, "statement.pdf");
            }
            DocumentDownload::Redirect(_) => panic!("local locator must not redirect"),
        }
    }

    #[tokio::test]
    async fn download_of_missing_blob_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blobs = Arc::new(RecordingBlobs::new(dir.path().to_owned()));
        let svc = service_with(InMemoryDocuments::default(), Arc::clone(&blobs), 1024);
        let owner = UserId::random();

        let document = svc.upload(owner, pdf(10)).await.expect("uploaded");
        tokio::fs::remove_file(dir.path().join(document.locator.as_str()))
            .await
            .expect("remove blob behind the record's back");

        let err = svc
            .download(document.id, owner)
            .await
            .expect_err("blob gone");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn delete_succeeds_even_when_blob_removal_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut recording = RecordingBlobs::new(dir.path().to_owned());
        recording.delete_outcome = BlobDeleteOutcome::Skipped;
        let blobs = Arc::new(recording);
        let svc = service_with(InMemoryDocuments::default(), Arc::clone(&blobs), 1024);
        let owner = UserId::random();

        let document = svc.upload(owner, pdf(10)).await.expect("uploaded");
        svc.delete(document.id, owner)
            .await
            .expect("metadata delete always wins");
        assert_eq!(
            blobs.deleted.lock().expect("deleted poisoned").as_slice(),
            [document.locator.as_str().to_owned()]
        );

        let err = svc.get(document.id, owner).await.expect_err("gone");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn delete_is_owner_scoped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blobs = Arc::new(RecordingBlobs::new(dir.path().to_owned()));
        let svc = service_with(InMemoryDocuments::default(), Arc::clone(&blobs), 1024);
        let owner = UserId::random();

        let document = svc.upload(owner, pdf(10)).await.expect("uploaded");
        let err = svc
            .delete(document.id, UserId::random())
            .await
            .expect_err("foreign owner");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert!(blobs.deleted.lock().expect("deleted poisoned").is_empty());
    }
}
