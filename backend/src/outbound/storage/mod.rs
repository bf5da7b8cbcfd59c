//! Blob storage adapters.
//!
//! Exactly one implementation is selected at bootstrap based on
//! configuration; everything downstream sees only `Arc<dyn BlobStore>`.
//!
//! Locators, not configuration, decide how a blob is reached: a locator
//! starting with `http` is fetched by redirect and deleted over HTTP, any
//! other locator is a filesystem path. Both adapters honour the tag, so
//! records written under one backend stay reachable after a switch.

mod local;
mod remote;

use std::path::Path;

use tracing::warn;
use url::Url;

use crate::domain::ports::BlobDeleteOutcome;

pub use local::{LOCAL_LOCATOR_PREFIX, LocalBlobStore};
pub use remote::RemoteBlobStore;

/// Parse a remote locator and append the `attachment=true` download hint.
pub(crate) fn attachment_redirect(raw: &str) -> Option<Url> {
    let mut url = Url::parse(raw).ok()?;
    url.query_pairs_mut().append_pair("attachment", "true");
    Some(url)
}

/// Remove a blob file, mapping the result onto the best-effort outcome.
pub(crate) async fn remove_blob_file(path: &Path) -> BlobDeleteOutcome {
    match tokio::fs::remove_file(path).await {
        Ok(()) => BlobDeleteOutcome::Deleted,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => BlobDeleteOutcome::Missing,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to delete local blob");
            BlobDeleteOutcome::Skipped
        }
    }
}
