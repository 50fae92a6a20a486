use paytracker_core::db::schema::{expected_schema, schema_digest, validate_table};
use paytracker_core::db::{open_db, open_db_in_memory, DbError};
use paytracker_core::ClientRepository;
use rusqlite::Connection;

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

fn persisted_digest(conn: &Connection) -> Option<String> {
    conn.query_row("SELECT digest FROM schema_master WHERE id = 1;", [], |row| {
        row.get(0)
    })
    .ok()
}

#[test]
fn first_open_creates_schema_and_digest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paytracker.db");

    let db = open_db(&path).unwrap();
    drop(db);

    let conn = Connection::open(&path).unwrap();
    assert_table_exists(&conn, "clients");
    assert_table_exists(&conn, "payments");
    assert_table_exists(&conn, "schema_master");
    assert_eq!(persisted_digest(&conn), Some(schema_digest()));
}

#[test]
fn reopening_same_store_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paytracker.db");

    drop(open_db(&path).unwrap());
    drop(open_db(&path).unwrap());

    let conn = Connection::open(&path).unwrap();
    assert_table_exists(&conn, "clients");
    assert_eq!(persisted_digest(&conn), Some(schema_digest()));
}

#[tokio::test]
async fn in_memory_open_creates_schema() {
    let db = open_db_in_memory().unwrap();
    assert!(db.client_repo().list().await.unwrap().is_empty());
}

#[test]
fn matching_digest_short_circuits_structural_checks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paytracker.db");
    drop(open_db(&path).unwrap());

    // A surplus column would fail full validation, but the persisted
    // digest still matches, so the reopen takes the fast path.
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("ALTER TABLE clients ADD COLUMN nickname TEXT;")
        .unwrap();
    drop(conn);

    assert!(open_db(&path).is_ok());
}

#[test]
fn stale_digest_with_intact_schema_is_refreshed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paytracker.db");
    drop(open_db(&path).unwrap());

    let conn = Connection::open(&path).unwrap();
    conn.execute(
        "UPDATE schema_master SET digest = 'bogus' WHERE id = 1;",
        [],
    )
    .unwrap();
    drop(conn);

    drop(open_db(&path).unwrap());

    let conn = Connection::open(&path).unwrap();
    assert_eq!(persisted_digest(&conn), Some(schema_digest()));
}

#[test]
fn missing_column_fails_open_with_schema_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drifted.db");

    // Hand-build a store whose clients table lost the phone column.
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE clients (
            id TEXT NOT NULL,
            name TEXT NOT NULL,
            company TEXT,
            email TEXT NOT NULL,
            address TEXT,
            createdAt INTEGER NOT NULL,
            PRIMARY KEY(id)
        );
        CREATE TABLE payments (
            id TEXT NOT NULL,
            clientId TEXT NOT NULL,
            invoiceNumber TEXT NOT NULL,
            amount REAL NOT NULL,
            dueDate INTEGER NOT NULL,
            paidDate INTEGER,
            status TEXT NOT NULL,
            description TEXT,
            createdAt INTEGER NOT NULL,
            PRIMARY KEY(id),
            FOREIGN KEY(clientId) REFERENCES clients(id)
                ON UPDATE NO ACTION ON DELETE CASCADE
        );
        CREATE INDEX index_payments_clientId ON payments(clientId);",
    )
    .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::SchemaMismatch { detail } => {
            assert!(detail.contains("phone"), "diff should name the column: {detail}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unopenable_path_reports_storage_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-subdir").join("paytracker.db");

    let err = open_db(&path).unwrap_err();
    assert!(matches!(err, DbError::StorageUnavailable(_)));
}

#[test]
fn digest_is_stable_across_calls() {
    assert_eq!(schema_digest(), schema_digest());
}

#[test]
fn validate_table_reports_type_drift() {
    let expected = expected_schema()
        .into_iter()
        .find(|table| table.name == "payments")
        .unwrap();
    let mut actual = expected.clone();
    actual
        .columns
        .iter_mut()
        .find(|column| column.name == "amount")
        .unwrap()
        .type_name = "TEXT".to_string();

    let detail = validate_table(&expected, &actual).unwrap_err();
    assert!(detail.contains("payments.amount"));
    assert!(detail.contains("REAL"));
}
