//! SQLite storage bootstrap and session entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for PayTracker core.
//! - Create the version-1 schema on first open, validate it on reopen.
//!
//! # Invariants
//! - Returned sessions have `foreign_keys=ON`.
//! - Schema drift is surfaced as [`DbError::SchemaMismatch`] at open
//!   time; it is never silently repaired.
//!
//! # See also
//! - docs/architecture/data-model.md

use std::error::Error;
use std::fmt::{Display, Formatter};

use rusqlite::ffi::ErrorCode;

mod database;
mod open;
pub mod schema;

pub use database::Database;
pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Storage-layer failure taxonomy.
#[derive(Debug)]
pub enum DbError {
    /// Expected and on-disk table shapes differ at open time. Fatal;
    /// the detail is a human-readable expected-vs-found diff.
    SchemaMismatch { detail: String },
    /// A write violated a primary-key, not-null or foreign-key
    /// constraint. The enclosing transaction was rolled back in full.
    ConstraintViolation(rusqlite::Error),
    /// The engine could not be opened or locked. Retryable by the
    /// caller; this layer performs no automatic retry.
    StorageUnavailable(rusqlite::Error),
    /// Any other engine-level failure.
    Sqlite(rusqlite::Error),
    /// The background blocking task was lost before it reported back.
    TaskFailed(String),
    /// The connection mutex was poisoned by a panicked holder.
    Poisoned,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SchemaMismatch { detail } => {
                write!(f, "database schema does not match expected shape: {detail}")
            }
            Self::ConstraintViolation(err) => write!(f, "constraint violation: {err}"),
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::TaskFailed(message) => {
                write!(f, "background database task failed: {message}")
            }
            Self::Poisoned => write!(f, "database connection lock poisoned"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ConstraintViolation(err)
            | Self::StorageUnavailable(err)
            | Self::Sqlite(err) => Some(err),
            Self::SchemaMismatch { .. } | Self::TaskFailed(_) | Self::Poisoned => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        match &value {
            rusqlite::Error::SqliteFailure(cause, _) => match cause.code {
                ErrorCode::ConstraintViolation => Self::ConstraintViolation(value),
                ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked => Self::StorageUnavailable(value),
                _ => Self::Sqlite(value),
            },
            _ => Self::Sqlite(value),
        }
    }
}
