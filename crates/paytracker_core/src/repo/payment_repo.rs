//! Payment repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the typed CRUD and query surface over the `payments`
//!   table, including the payment+client join projection.
//!
//! # Invariants
//! - `upsert` of a payment with an unknown `client_id` fails with a
//!   constraint violation and persists nothing.
//! - `count_by_client` returns 0 for an unknown client, never an error.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, Row};

use crate::invalidation::{InvalidationTracker, Table};
use crate::model::payment::{Payment, PaymentStatus, PaymentWithClient};
use crate::repo::{lock_conn, run_blocking, RepoError, RepoResult};

const PAYMENT_SELECT_SQL: &str = "SELECT
    id,
    clientId,
    invoiceNumber,
    amount,
    dueDate,
    paidDate,
    status,
    description,
    createdAt
FROM payments";

const PAYMENT_WITH_CLIENT_SELECT_SQL: &str = "SELECT
    payments.id,
    payments.clientId,
    payments.invoiceNumber,
    payments.amount,
    payments.dueDate,
    payments.paidDate,
    payments.status,
    payments.description,
    payments.createdAt,
    clients.name AS clientName
FROM payments
JOIN clients ON clients.id = payments.clientId";

/// Repository interface for payment CRUD and query operations.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Inserts or fully replaces the row keyed by `payment.id`.
    async fn upsert(&self, payment: &Payment) -> RepoResult<()>;
    /// All payments, most recently created first.
    async fn list(&self) -> RepoResult<Vec<Payment>>;
    /// All payments joined with their owning client's name, most
    /// recently created first. Inner join: a payment whose client is
    /// gone cannot appear.
    async fn list_with_client(&self) -> RepoResult<Vec<PaymentWithClient>>;
    /// Number of payments owed by `client_id`; 0 when the client has
    /// none or does not exist.
    async fn count_by_client(&self, client_id: &str) -> RepoResult<i64>;
}

/// SQLite-backed payment repository.
pub struct SqlitePaymentRepository {
    conn: Arc<Mutex<Connection>>,
    tracker: Arc<InvalidationTracker>,
}

impl SqlitePaymentRepository {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>, tracker: Arc<InvalidationTracker>) -> Self {
        Self { conn, tracker }
    }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn upsert(&self, payment: &Payment) -> RepoResult<()> {
        payment.validate()?;

        let conn = Arc::clone(&self.conn);
        let payment = payment.clone();
        run_blocking(move || {
            let mut guard = lock_conn(&conn)?;
            let tx = guard.transaction()?;
            upsert_payment_row(&tx, &payment)?;
            tx.commit()?;
            Ok(())
        })
        .await?;

        self.tracker.publish(&[Table::Payments]);
        Ok(())
    }

    async fn list(&self) -> RepoResult<Vec<Payment>> {
        let conn = Arc::clone(&self.conn);
        run_blocking(move || {
            let guard = lock_conn(&conn)?;
            let mut stmt =
                guard.prepare(&format!("{PAYMENT_SELECT_SQL} ORDER BY createdAt DESC;"))?;
            let mut rows = stmt.query([])?;
            let mut payments = Vec::new();
            while let Some(row) = rows.next()? {
                payments.push(parse_payment_row(row)?);
            }
            Ok(payments)
        })
        .await
    }

    async fn list_with_client(&self) -> RepoResult<Vec<PaymentWithClient>> {
        let conn = Arc::clone(&self.conn);
        run_blocking(move || {
            let guard = lock_conn(&conn)?;
            let mut stmt = guard.prepare(&format!(
                "{PAYMENT_WITH_CLIENT_SELECT_SQL} ORDER BY payments.createdAt DESC;"
            ))?;
            let mut rows = stmt.query([])?;
            let mut joined = Vec::new();
            while let Some(row) = rows.next()? {
                joined.push(PaymentWithClient {
                    payment: parse_payment_row(row)?,
                    client_name: row.get("clientName")?,
                });
            }
            Ok(joined)
        })
        .await
    }

    async fn count_by_client(&self, client_id: &str) -> RepoResult<i64> {
        let conn = Arc::clone(&self.conn);
        let client_id = client_id.to_string();
        run_blocking(move || {
            let guard = lock_conn(&conn)?;
            let count = guard.query_row(
                "SELECT COUNT(*) FROM payments WHERE clientId = ?1;",
                [client_id.as_str()],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
    }
}

/// Insert-or-replace of one payment row inside the caller's
/// transaction. Shared by the repository upsert and the snapshot
/// import path.
pub(crate) fn upsert_payment_row(conn: &Connection, payment: &Payment) -> RepoResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO payments (
            id,
            clientId,
            invoiceNumber,
            amount,
            dueDate,
            paidDate,
            status,
            description,
            createdAt
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
        params![
            payment.id,
            payment.client_id,
            payment.invoice_number,
            payment.amount,
            payment.due_date,
            payment.paid_date,
            payment.status.as_str(),
            payment.description,
            payment.created_at,
        ],
    )?;
    Ok(())
}

pub(crate) fn parse_payment_row(row: &Row<'_>) -> RepoResult<Payment> {
    let status_text: String = row.get("status")?;
    let status = PaymentStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status value `{status_text}` in payments.status"
        ))
    })?;

    Ok(Payment {
        id: row.get("id")?,
        client_id: row.get("clientId")?,
        invoice_number: row.get("invoiceNumber")?,
        amount: row.get("amount")?,
        due_date: row.get("dueDate")?,
        paid_date: row.get("paidDate")?,
        status,
        description: row.get("description")?,
        created_at: row.get("createdAt")?,
    })
}
