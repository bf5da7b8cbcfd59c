//! SQLite connection pooling for the persistence adapters.
//!
//! Diesel's SQLite driver is synchronous, so every query runs on the
//! blocking thread pool via [`DbPool::run`]. Connections are configured
//! on checkout with the pragmas the vault relies on (foreign keys and a
//! busy timeout so concurrent writers back off instead of failing).

use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::SqliteConnection;
use thiserror::Error;

use crate::domain::ports::RepositoryError;

/// Pooled SQLite handle shared by the Diesel repositories.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<ConnectionManager<SqliteConnection>>,
}

/// Failures while building the pool at startup.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool could not open its initial connections.
    #[error("failed to initialise database pool: {0}")]
    Build(#[from] diesel::r2d2::PoolError),
}

#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(
            "PRAGMA busy_timeout = 5000;\
             PRAGMA foreign_keys = ON;\
             PRAGMA journal_mode = WAL;",
        )
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

impl DbPool {
    /// Open a pool against `database_url`, which may be a file path or
    /// `:memory:` for tests.
    pub fn new(database_url: &str) -> Result<Self, PoolError> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let inner = Pool::builder()
            .max_size(8)
            .connection_timeout(Duration::from_secs(10))
            .connection_customizer(Box::new(SqlitePragmas))
            .build(manager)?;
        Ok(Self { inner })
    }

    /// Check out a connection synchronously. Callers already on the
    /// blocking pool (migrations, tests) use this directly.
    pub fn get(
        &self,
    ) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>, RepositoryError> {
        self.inner
            .get()
            .map_err(|err| RepositoryError::connection(err.to_string()))
    }

    /// Run a Diesel operation on the blocking thread pool.
    pub async fn run<T, F>(&self, op: F) -> Result<T, RepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, diesel::result::Error> + Send + 'static,
    {
        let pool = self.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            op(&mut conn).map_err(super::map_diesel_error)
        })
        .await
        .map_err(|err| RepositoryError::connection(format!("blocking task failed: {err}")))?
    }
}
