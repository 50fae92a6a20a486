//! Client repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the typed CRUD surface over the `clients` table.
//! - Publish invalidation for every committed write.
//!
//! # Invariants
//! - `upsert` is insert-or-fully-replace keyed by `id`; callers carry
//!   `created_at` forward when replacing.
//! - Deleting a client cascades to its payments, so observers of BOTH
//!   tables are notified.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, Row};

use crate::invalidation::{InvalidationTracker, Table};
use crate::model::client::Client;
use crate::repo::{lock_conn, run_blocking, RepoResult};

const CLIENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    company,
    email,
    phone,
    address,
    createdAt
FROM clients";

/// Repository interface for client CRUD operations.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Inserts or fully replaces the row keyed by `client.id`.
    async fn upsert(&self, client: &Client) -> RepoResult<()>;
    /// Deletes the row with the given id; payments referencing it are
    /// cascade-deleted by the engine.
    async fn delete_by_id(&self, id: &str) -> RepoResult<()>;
    /// All clients, most recently created first.
    async fn list(&self) -> RepoResult<Vec<Client>>;
    /// One client, or `None` when absent. Absence is never an error.
    async fn get_by_id(&self, id: &str) -> RepoResult<Option<Client>>;
}

/// SQLite-backed client repository.
pub struct SqliteClientRepository {
    conn: Arc<Mutex<Connection>>,
    tracker: Arc<InvalidationTracker>,
}

impl SqliteClientRepository {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>, tracker: Arc<InvalidationTracker>) -> Self {
        Self { conn, tracker }
    }
}

#[async_trait]
impl ClientRepository for SqliteClientRepository {
    async fn upsert(&self, client: &Client) -> RepoResult<()> {
        client.validate()?;

        let conn = Arc::clone(&self.conn);
        let client = client.clone();
        run_blocking(move || {
            let mut guard = lock_conn(&conn)?;
            let tx = guard.transaction()?;
            upsert_client_row(&tx, &client)?;
            tx.commit()?;
            Ok(())
        })
        .await?;

        self.tracker.publish(&[Table::Clients]);
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> RepoResult<()> {
        let conn = Arc::clone(&self.conn);
        let id = id.to_string();
        let changed = run_blocking(move || {
            let mut guard = lock_conn(&conn)?;
            let tx = guard.transaction()?;
            let changed = tx.execute("DELETE FROM clients WHERE id = ?1;", [id.as_str()])?;
            tx.commit()?;
            Ok(changed)
        })
        .await?;

        if changed > 0 {
            // The cascade removes the client's payments in the same
            // commit; observers of the child table must learn about it.
            self.tracker.publish(&[Table::Clients, Table::Payments]);
        }
        Ok(())
    }

    async fn list(&self) -> RepoResult<Vec<Client>> {
        let conn = Arc::clone(&self.conn);
        run_blocking(move || {
            let guard = lock_conn(&conn)?;
            let mut stmt = guard.prepare(&format!("{CLIENT_SELECT_SQL} ORDER BY createdAt DESC;"))?;
            let mut rows = stmt.query([])?;
            let mut clients = Vec::new();
            while let Some(row) = rows.next()? {
                clients.push(parse_client_row(row)?);
            }
            Ok(clients)
        })
        .await
    }

    async fn get_by_id(&self, id: &str) -> RepoResult<Option<Client>> {
        let conn = Arc::clone(&self.conn);
        let id = id.to_string();
        run_blocking(move || {
            let guard = lock_conn(&conn)?;
            let mut stmt = guard.prepare(&format!("{CLIENT_SELECT_SQL} WHERE id = ?1;"))?;
            let mut rows = stmt.query([id.as_str()])?;
            match rows.next()? {
                Some(row) => Ok(Some(parse_client_row(row)?)),
                None => Ok(None),
            }
        })
        .await
    }
}

/// Insert-or-replace of one client row inside the caller's transaction.
///
/// Shared by the repository upsert and the snapshot import path.
pub(crate) fn upsert_client_row(conn: &Connection, client: &Client) -> RepoResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO clients (
            id,
            name,
            company,
            email,
            phone,
            address,
            createdAt
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            client.id,
            client.name,
            client.company,
            client.email,
            client.phone,
            client.address,
            client.created_at,
        ],
    )?;
    Ok(())
}

pub(crate) fn parse_client_row(row: &Row<'_>) -> RepoResult<Client> {
    Ok(Client {
        id: row.get("id")?,
        name: row.get("name")?,
        company: row.get("company")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        address: row.get("address")?,
        created_at: row.get("createdAt")?,
    })
}
