//! Database session owning the storage handle.
//!
//! # Responsibility
//! - Own the shared SQLite connection for the process.
//! - Hand out the two repository singletons.
//! - Provide the destructive full reset used by administration.
//!
//! # Invariants
//! - Each repository is constructed exactly once per session; every
//!   caller receives the same instance, including under concurrent
//!   first access.
//! - `clear_all` leaves either every table empty or none modified.
//!
//! # See also
//! - docs/architecture/data-model.md

use std::sync::{Arc, Mutex};
use std::time::Instant;

use log::{error, info};
use once_cell::sync::OnceCell;
use rusqlite::Connection;
use tokio::task;

use super::{DbError, DbResult};
use crate::invalidation::{InvalidationTracker, Table};
use crate::repo::client_repo::SqliteClientRepository;
use crate::repo::payment_repo::SqlitePaymentRepository;

/// Ready storage session.
///
/// A value of this type is the `Ready` state of the open protocol: it
/// only exists after schema creation/validation succeeded. Shared-state
/// layout follows the single-connection model: one mutex-guarded
/// handle, serialized writers, `spawn_blocking` execution for every
/// store-touching operation.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    tracker: Arc<InvalidationTracker>,
    clients: OnceCell<Arc<SqliteClientRepository>>,
    payments: OnceCell<Arc<SqlitePaymentRepository>>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    pub(crate) fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            tracker: Arc::new(InvalidationTracker::new()),
            clients: OnceCell::new(),
            payments: OnceCell::new(),
        }
    }

    /// The process-wide invalidation registry for this session.
    pub fn tracker(&self) -> &Arc<InvalidationTracker> {
        &self.tracker
    }

    pub(crate) fn connection(&self) -> &Arc<Mutex<Connection>> {
        &self.conn
    }

    /// The client repository singleton.
    ///
    /// Constructed once under the cell's own mutual exclusion; all
    /// later callers receive the same instance.
    pub fn client_repo(&self) -> &Arc<SqliteClientRepository> {
        self.clients.get_or_init(|| {
            Arc::new(SqliteClientRepository::new(
                Arc::clone(&self.conn),
                Arc::clone(&self.tracker),
            ))
        })
    }

    /// The payment repository singleton.
    pub fn payment_repo(&self) -> &Arc<SqlitePaymentRepository> {
        self.payments.get_or_init(|| {
            Arc::new(SqlitePaymentRepository::new(
                Arc::clone(&self.conn),
                Arc::clone(&self.tracker),
            ))
        })
    }

    /// Destructive full reset.
    ///
    /// Deletes every row of every table in one transaction with
    /// foreign-key checks suspended, restores enforcement, then
    /// reclaims file space. The connection lock is held for the whole
    /// sequence, so no caller of this session can observe a state with
    /// some tables empty and others not. The schema digest row is
    /// preserved; a cleared store reopens through the digest fast path.
    ///
    /// # Side effects
    /// - Notifies invalidation observers of both tables.
    /// - Emits a `clear_all` logging event with duration and status.
    pub async fn clear_all(&self) -> DbResult<()> {
        let started_at = Instant::now();
        let conn = Arc::clone(&self.conn);

        let result = task::spawn_blocking(move || -> DbResult<()> {
            let mut guard = conn.lock().map_err(|_| DbError::Poisoned)?;
            guard.execute_batch("PRAGMA foreign_keys = OFF;")?;
            let wiped = delete_all_rows(&mut guard);
            // Enforcement must come back regardless of the wipe outcome.
            let restored = guard.execute_batch("PRAGMA foreign_keys = ON;");
            wiped?;
            restored?;
            guard.execute_batch("VACUUM;")?;
            Ok(())
        })
        .await
        .map_err(|err| DbError::TaskFailed(err.to_string()))?;

        match result {
            Ok(()) => {
                info!(
                    "event=clear_all module=db status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                self.tracker.publish(&[Table::Clients, Table::Payments]);
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=clear_all module=db status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn delete_all_rows(conn: &mut Connection) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM payments;", [])?;
    tx.execute("DELETE FROM clients;", [])?;
    tx.commit()?;
    Ok(())
}
