//! Domain entities, ports, and use-case services.
//!
//! Everything here is transport agnostic: HTTP adapters live under
//! `inbound`, persistence and storage adapters under `outbound`. The only
//! shared currency is the strongly typed entities, the ports, and
//! [`DomainError`].

pub mod account_service;
pub mod document;
pub mod document_service;
pub mod error;
pub mod password_entry;
pub mod password_service;
pub mod ports;
pub mod profile_service;
pub mod upload;
pub mod user;

pub use self::account_service::{AccountOps, AccountService, AuthenticatedAccount};
pub use self::document::{Document, Locator};
pub use self::document_service::{DocumentDownload, DocumentOps, DocumentService};
pub use self::error::{DomainError, ErrorCode};
pub use self::password_entry::{Category, EntryDraft, PasswordEntry};
pub use self::password_service::{PasswordEntryOps, PasswordEntryService};
pub use self::profile_service::{ProfileOps, ProfileService};
pub use self::upload::{UploadLimits, UploadedFile};
pub use self::user::{ProfileUpdate, User, UserId};
