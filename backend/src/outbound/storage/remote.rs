//! HTTP object-store blob adapter.
//!
//! Blobs are `PUT` to the configured base URL and addressed afterwards by
//! the public URL the store returns. Deletion works backwards from that
//! URL: the public identifier sits after a fixed `upload` path marker,
//! behind an optional `v<digits>` version segment, with the file extension
//! stripped. A URL that does not match that shape is skipped rather than
//! failed, deletion here is always best effort.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;
use url::Url;

use crate::domain::Locator;
use crate::domain::ports::{
    BlobDeleteOutcome, BlobNamespace, BlobStore, BlobStoreError, RetrievalTarget,
};

/// Path segment that precedes the public identifier in store URLs.
const UPLOAD_MARKER: &str = "upload";

/// Blob store backed by a remote HTTP object store.
pub struct RemoteBlobStore {
    client: Client,
    base: Url,
}

impl RemoteBlobStore {
    /// Build the adapter against the store's base URL.
    #[must_use]
    pub fn new(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    fn object_url(&self, path: &str) -> Result<Url, BlobStoreError> {
        self.base
            .join(path)
            .map_err(|err| BlobStoreError::write(format!("invalid object path {path}: {err}")))
    }
}

/// Extract the public identifier from a store URL, or `None` when the URL
/// does not have the expected shape.
pub(crate) fn public_id_from_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    let marker = segments.iter().position(|segment| *segment == UPLOAD_MARKER)?;
    let mut rest = &segments[marker + 1..];
    if let Some((first, tail)) = rest.split_first() {
        let is_version = first.len() > 1
            && first.starts_with('v')
            && first[1..].chars().all(|c| c.is_ascii_digit());
        if is_version {
            rest = tail;
        }
    }
    if rest.is_empty() {
        return None;
    }
    let joined = rest.join("/");
    let trimmed = match joined.rfind('.') {
        Some(dot) if dot > joined.rfind('/').map_or(0, |slash| slash + 1) => {
            joined[..dot].to_owned()
        }
        _ => joined,
    };
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

#[async_trait]
impl BlobStore for RemoteBlobStore {
    async fn store(
        &self,
        bytes: Vec<u8>,
        namespace: BlobNamespace,
        name: &str,
    ) -> Result<Locator, BlobStoreError> {
        let target = self.object_url(&format!("{}/{name}", namespace.as_str()))?;
        let response = self
            .client
            .put(target.clone())
            .body(bytes)
            .send()
            .await
            .map_err(|err| BlobStoreError::write(err.to_string()))?;
        if !response.status().is_success() {
            return Err(BlobStoreError::write(format!(
                "store responded {} for {target}",
                response.status()
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|err| BlobStoreError::write(err.to_string()))?;
        let public = body.trim();
        let locator = if public.is_empty() {
            target.to_string()
        } else {
            Url::parse(public)
                .map_err(|err| BlobStoreError::write(format!("store returned bad URL: {err}")))?
                .to_string()
        };
        Ok(Locator::new(locator))
    }

    async fn delete(&self, locator: &Locator) -> BlobDeleteOutcome {
        if !locator.is_remote() {
            // Written under a local backend; the file is still on disk.
            return super::remove_blob_file(Path::new(locator.as_str())).await;
        }
        let Some(public_id) = public_id_from_url(locator.as_str()) else {
            warn!(locator = locator.as_str(), "unparseable remote locator, skipping delete");
            return BlobDeleteOutcome::Skipped;
        };
        let target = match self.object_url(&public_id) {
            Ok(url) => url,
            Err(err) => {
                warn!(locator = locator.as_str(), error = %err, "bad delete target");
                return BlobDeleteOutcome::Skipped;
            }
        };
        match self.client.delete(target).send().await {
            Ok(response) if response.status() == reqwest::StatusCode::NOT_FOUND => {
                BlobDeleteOutcome::Missing
            }
            Ok(response) if response.status().is_success() => BlobDeleteOutcome::Deleted,
            Ok(response) => {
                warn!(
                    locator = locator.as_str(),
                    status = %response.status(),
                    "remote delete rejected"
                );
                BlobDeleteOutcome::Skipped
            }
            Err(err) => {
                warn!(locator = locator.as_str(), error = %err, "remote delete failed");
                BlobDeleteOutcome::Skipped
            }
        }
    }

    fn resolve(&self, locator: &Locator) -> RetrievalTarget {
        if !locator.is_remote() {
            return RetrievalTarget::LocalFile(PathBuf::from(locator.as_str()));
        }
        let url = super::attachment_redirect(locator.as_str()).unwrap_or_else(|| {
            warn!(locator = locator.as_str(), "bad remote locator");
            let mut url = self.base.clone();
            url.query_pairs_mut().append_pair("attachment", "true");
            url
        });
        RetrievalTarget::Redirect(url)
    }
}
