//! Diesel/SQLite persistence adapters.
//!
//! Each repository owns a clone of the shared [`DbPool`] and maps Diesel
//! failures onto [`RepositoryError`] at this boundary, so the domain never
//! sees driver types.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::domain::ports::RepositoryError;

mod diesel_document_repository;
mod diesel_password_entry_repository;
mod diesel_user_repository;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_document_repository::DieselDocumentRepository;
pub use diesel_password_entry_repository::DieselPasswordEntryRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolError};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply any pending migrations. Called once at startup before the server
/// accepts traffic.
pub fn run_migrations(pool: &DbPool) -> Result<(), RepositoryError> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|err| RepositoryError::query(format!("migrations failed: {err}")))
}

/// Translate a Diesel error into the repository error taxonomy.
pub(crate) fn map_diesel_error(err: DieselError) -> RepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            RepositoryError::conflict(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            RepositoryError::connection(info.message().to_owned())
        }
        other => RepositoryError::query(other.to_string()),
    }
}
