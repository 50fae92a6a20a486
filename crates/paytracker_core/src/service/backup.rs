//! Whole-store snapshot export and import.
//!
//! # Responsibility
//! - Capture every client and payment as one serializable snapshot.
//! - Replace the entire store contents from a snapshot atomically.
//!
//! # Invariants
//! - Import validates every entity before touching the store, inserts
//!   clients before payments so foreign keys hold, and either replaces
//!   everything or nothing.

use std::sync::Arc;
use std::time::Instant;

use log::info;
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::invalidation::Table;
use crate::model::client::Client;
use crate::model::payment::Payment;
use crate::repo::client_repo::{upsert_client_row, ClientRepository};
use crate::repo::payment_repo::{upsert_payment_row, PaymentRepository};
use crate::repo::{lock_conn, run_blocking, RepoResult};

/// Serializable image of the full store.
///
/// Interchange layout: `{ "clients": [...], "payments": [...] }` with
/// camelCase entity fields, so backup files stay readable and diffable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub clients: Vec<Client>,
    pub payments: Vec<Payment>,
}

/// Reads the full store into a snapshot.
pub async fn export_snapshot(db: &Database) -> RepoResult<Snapshot> {
    Ok(Snapshot {
        clients: db.client_repo().list().await?,
        payments: db.payment_repo().list().await?,
    })
}

/// Replaces the entire store contents with `snapshot`.
///
/// # Side effects
/// - Notifies invalidation observers of both tables after commit.
/// - Emits a `snapshot_import` logging event with counts and duration.
pub async fn import_snapshot(db: &Database, snapshot: &Snapshot) -> RepoResult<()> {
    for client in &snapshot.clients {
        client.validate()?;
    }
    for payment in &snapshot.payments {
        payment.validate()?;
    }

    let started_at = Instant::now();
    let conn = Arc::clone(db.connection());
    let snapshot = snapshot.clone();
    let (client_count, payment_count) = run_blocking(move || {
        let mut guard = lock_conn(&conn)?;
        let tx = guard.transaction()?;
        tx.execute("DELETE FROM payments;", [])?;
        tx.execute("DELETE FROM clients;", [])?;
        for client in &snapshot.clients {
            upsert_client_row(&tx, client)?;
        }
        for payment in &snapshot.payments {
            upsert_payment_row(&tx, payment)?;
        }
        tx.commit()?;
        Ok((snapshot.clients.len(), snapshot.payments.len()))
    })
    .await?;

    info!(
        "event=snapshot_import module=service status=ok clients={client_count} payments={payment_count} duration_ms={}",
        started_at.elapsed().as_millis()
    );
    db.tracker().publish(&[Table::Clients, Table::Payments]);
    Ok(())
}
