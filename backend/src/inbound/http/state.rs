//! Shared HTTP adapter state.
//!
//! Handlers receive this bundle via `actix_web::web::Data` and only ever
//! talk to driving ports, so the whole HTTP surface is testable with
//! in-memory fakes.

use std::sync::Arc;

use crate::domain::{AccountOps, DocumentOps, PasswordEntryOps, ProfileOps};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountOps>,
    pub passwords: Arc<dyn PasswordEntryOps>,
    pub documents: Arc<dyn DocumentOps>,
    pub profile: Arc<dyn ProfileOps>,
}

impl HttpState {
    /// Bundle the use-case services the handlers depend on.
    pub fn new(
        accounts: Arc<dyn AccountOps>,
        passwords: Arc<dyn PasswordEntryOps>,
        documents: Arc<dyn DocumentOps>,
        profile: Arc<dyn ProfileOps>,
    ) -> Self {
        Self {
            accounts,
            passwords,
            documents,
            profile,
        }
    }
}
