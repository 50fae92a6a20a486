//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for clients and
//!   payments.
//! - Isolate SQLite query details from callers.
//!
//! # Invariants
//! - Repository writes enforce entity `validate()` before any SQL runs.
//! - Every store-touching operation is an awaitable unit backed by
//!   `spawn_blocking`; dropping the returned future abandons only the
//!   caller's wait, never the transaction's atomicity.
//! - Invalidation observers are notified strictly after commit.
//!
//! # See also
//! - docs/architecture/data-model.md

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use tokio::task;

use crate::db::DbError;
use crate::model::ValidationError;

pub mod client_repo;
pub mod payment_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::from(value))
    }
}

/// Runs a blocking storage unit on the blocking pool.
///
/// The unit runs to completion even if the returned future is dropped,
/// so cancellation can never leave a torn write behind.
pub(crate) async fn run_blocking<T, F>(unit: F) -> RepoResult<T>
where
    F: FnOnce() -> RepoResult<T> + Send + 'static,
    T: Send + 'static,
{
    match task::spawn_blocking(unit).await {
        Ok(result) => result,
        Err(err) => Err(RepoError::Db(DbError::TaskFailed(err.to_string()))),
    }
}

pub(crate) fn lock_conn(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, RepoError> {
    conn.lock().map_err(|_| RepoError::Db(DbError::Poisoned))
}
