//! Connection bootstrap for the PayTracker store.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Create the schema on first open, validate it on every reopen.
//! - Configure connection pragmas required by core behavior.
//!
//! # Invariants
//! - Returned sessions have `foreign_keys=ON`.
//! - A store whose schema drifted from the expected shape never opens;
//!   the caller receives `DbError::SchemaMismatch` with a diff.
//!
//! # See also
//! - docs/architecture/data-model.md

use std::path::Path;
use std::time::{Duration, Instant};

use log::{error, info};
use rusqlite::Connection;

use super::schema::{self, CLIENTS_TABLE, PAYMENTS_TABLE, SCHEMA_MASTER_TABLE};
use super::{Database, DbError, DbResult};

/// Opens a SQLite database file and returns a ready session.
///
/// # Side effects
/// - Creates the schema and digest row on a first-ever open.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Database> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=file");

    let mut conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode=file duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(Database::new(conn))
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Opens an in-memory SQLite database and returns a ready session.
///
/// # Side effects
/// - Always performs a first-ever-open schema creation.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db_in_memory() -> DbResult<Database> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    let mut conn = match Connection::open_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=memory duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode=memory duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(Database::new(conn))
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=memory duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    initialize_or_validate(conn)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(())
}

/// First open creates the schema and records its digest; reopen
/// validates, digest fast path first, full structural comparison on a
/// digest miss.
fn initialize_or_validate(conn: &mut Connection) -> DbResult<()> {
    let has_clients = schema::table_exists(conn, CLIENTS_TABLE)?;
    let has_payments = schema::table_exists(conn, PAYMENTS_TABLE)?;

    if !has_clients && !has_payments {
        let tx = conn.transaction()?;
        for statement in schema::all_create_statements() {
            tx.execute_batch(statement)?;
        }
        schema::write_persisted_digest(&tx, &schema::schema_digest())?;
        tx.commit()?;
        info!("event=schema_create module=db status=ok");
        return Ok(());
    }

    let expected_digest = schema::schema_digest();
    let persisted_digest = if schema::table_exists(conn, SCHEMA_MASTER_TABLE)? {
        schema::read_persisted_digest(conn)?
    } else {
        None
    };

    if persisted_digest.as_deref() == Some(expected_digest.as_str()) {
        info!("event=schema_validate module=db status=ok mode=digest");
        return Ok(());
    }

    for expected in schema::expected_schema() {
        let actual = schema::read_table_shape(conn, &expected.name)?;
        if let Err(detail) = schema::validate_table(&expected, &actual) {
            error!(
                "event=schema_validate module=db status=error table={} detail={detail}",
                expected.name
            );
            return Err(DbError::SchemaMismatch { detail });
        }
    }

    // Structure checks out but the digest row is stale or absent;
    // refresh the metadata so the next open takes the fast path.
    let tx = conn.transaction()?;
    tx.execute_batch(schema::CREATE_SCHEMA_MASTER_TABLE)?;
    schema::write_persisted_digest(&tx, &expected_digest)?;
    tx.commit()?;
    info!("event=schema_validate module=db status=ok mode=full");
    Ok(())
}
