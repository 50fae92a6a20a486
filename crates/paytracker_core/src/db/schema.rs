//! Authoritative schema description and structural validation.
//!
//! # Responsibility
//! - Describe the expected shape of every table as hand-maintained
//!   constants: columns, foreign keys and indices.
//! - Introspect the physical shape of an opened store and compare it
//!   structurally against the expected shape.
//! - Derive the schema digest persisted in the metadata table as the
//!   fast-path identity check.
//!
//! # Invariants
//! - Version 1 is the only schema generation; there are no migrations.
//! - `schema_master` is reserved metadata and is excluded from
//!   structural validation.
//!
//! # See also
//! - docs/architecture/data-model.md

use std::fmt::Write as _;

use rusqlite::Connection;

use super::DbResult;

pub const CLIENTS_TABLE: &str = "clients";
pub const PAYMENTS_TABLE: &str = "payments";
pub const SCHEMA_MASTER_TABLE: &str = "schema_master";

/// SQL to create the clients table.
pub const CREATE_CLIENTS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS clients (
    id TEXT NOT NULL,
    name TEXT NOT NULL,
    company TEXT,
    email TEXT NOT NULL,
    phone TEXT,
    address TEXT,
    createdAt INTEGER NOT NULL,
    PRIMARY KEY(id)
)";

/// SQL to create the payments table.
pub const CREATE_PAYMENTS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS payments (
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
)";

/// SQL to create the payment-by-client lookup index.
pub const CREATE_PAYMENTS_CLIENT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS index_payments_clientId ON payments(clientId)";

/// SQL to create the reserved schema-identity metadata table.
pub const CREATE_SCHEMA_MASTER_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS schema_master (
    id INTEGER PRIMARY KEY,
    digest TEXT NOT NULL
)";

const SCHEMA_MASTER_ROW_ID: i64 = 1;

/// All DDL statements for a first-ever open, in dependency order.
pub fn all_create_statements() -> &'static [&'static str] {
    &[
        CREATE_CLIENTS_TABLE,
        CREATE_PAYMENTS_TABLE,
        CREATE_PAYMENTS_CLIENT_INDEX,
        CREATE_SCHEMA_MASTER_TABLE,
    ]
}

/// Expected shape of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnShape {
    pub name: String,
    /// Declared type, compared case-insensitively.
    pub type_name: String,
    pub not_null: bool,
    /// 1-based position within the primary key, 0 when not part of it.
    pub pk_ordinal: u32,
    pub default: Option<String>,
}

/// Expected shape of one foreign key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ForeignKeyShape {
    pub referenced_table: String,
    pub columns: Vec<String>,
    pub referenced_columns: Vec<String>,
    pub on_delete: String,
}

/// Expected shape of one explicitly created index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IndexShape {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

/// Expected shape of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableShape {
    pub name: String,
    pub columns: Vec<ColumnShape>,
    pub foreign_keys: Vec<ForeignKeyShape>,
    pub indices: Vec<IndexShape>,
}

fn column(name: &str, type_name: &str, not_null: bool, pk_ordinal: u32) -> ColumnShape {
    ColumnShape {
        name: name.to_string(),
        type_name: type_name.to_string(),
        not_null,
        pk_ordinal,
        default: None,
    }
}

fn expected_clients() -> TableShape {
    TableShape {
        name: CLIENTS_TABLE.to_string(),
        columns: vec![
            column("id", "TEXT", true, 1),
            column("name", "TEXT", true, 0),
            column("company", "TEXT", false, 0),
            column("email", "TEXT", true, 0),
            column("phone", "TEXT", false, 0),
            column("address", "TEXT", false, 0),
            column("createdAt", "INTEGER", true, 0),
        ],
        foreign_keys: Vec::new(),
        indices: Vec::new(),
    }
}

fn expected_payments() -> TableShape {
    TableShape {
        name: PAYMENTS_TABLE.to_string(),
        columns: vec![
            column("id", "TEXT", true, 1),
            column("clientId", "TEXT", true, 0),
            column("invoiceNumber", "TEXT", true, 0),
            column("amount", "REAL", true, 0),
            column("dueDate", "INTEGER", true, 0),
            column("paidDate", "INTEGER", false, 0),
            column("status", "TEXT", true, 0),
            column("description", "TEXT", false, 0),
            column("createdAt", "INTEGER", true, 0),
        ],
        foreign_keys: vec![ForeignKeyShape {
            referenced_table: CLIENTS_TABLE.to_string(),
            columns: vec!["clientId".to_string()],
            referenced_columns: vec!["id".to_string()],
            on_delete: "CASCADE".to_string(),
        }],
        indices: vec![IndexShape {
            name: "index_payments_clientId".to_string(),
            columns: vec!["clientId".to_string()],
            unique: false,
        }],
    }
}

/// Expected shapes of every validated table, in declaration order.
pub fn expected_schema() -> Vec<TableShape> {
    vec![expected_clients(), expected_payments()]
}

/// Identity digest over the full expected schema.
///
/// Persisted in `schema_master` and compared at every open as the
/// fast-path alternative to full structural validation.
pub fn schema_digest() -> String {
    let mut rendering = String::new();
    for table in expected_schema() {
        render_table(&mut rendering, &table);
    }
    blake3::hash(rendering.as_bytes()).to_hex().to_string()
}

fn render_table(out: &mut String, table: &TableShape) {
    let _ = writeln!(out, "table={}", table.name);
    for column in &table.columns {
        let _ = writeln!(
            out,
            "column={} type={} notnull={} pk={} default={}",
            column.name,
            column.type_name.to_ascii_uppercase(),
            column.not_null as u8,
            column.pk_ordinal,
            column.default.as_deref().unwrap_or("-"),
        );
    }
    for fk in &table.foreign_keys {
        let _ = writeln!(
            out,
            "fk={}({}) -> {}({}) on_delete={}",
            table.name,
            fk.columns.join(","),
            fk.referenced_table,
            fk.referenced_columns.join(","),
            fk.on_delete,
        );
    }
    for index in &table.indices {
        let _ = writeln!(
            out,
            "index={} columns={} unique={}",
            index.name,
            index.columns.join(","),
            index.unique as u8,
        );
    }
}

/// Returns whether `table` physically exists in the store.
pub fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Introspects the physical shape of `table`.
///
/// A missing table yields a shape with no columns; `validate_table`
/// reports that as a mismatch rather than treating it specially here.
pub fn read_table_shape(conn: &Connection, table: &str) -> DbResult<TableShape> {
    let mut columns = Vec::new();
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{table}');"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        columns.push(ColumnShape {
            name: row.get("name")?,
            type_name: row.get("type")?,
            not_null: row.get::<_, i64>("notnull")? != 0,
            pk_ordinal: row.get::<_, i64>("pk")? as u32,
            default: row.get("dflt_value")?,
        });
    }

    let mut foreign_keys: Vec<ForeignKeyShape> = Vec::new();
    let mut stmt = conn.prepare(&format!("PRAGMA foreign_key_list('{table}');"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let seq: i64 = row.get("seq")?;
        let from: String = row.get("from")?;
        let to: String = row.get("to")?;
        if seq == 0 {
            foreign_keys.push(ForeignKeyShape {
                referenced_table: row.get("table")?,
                columns: vec![from],
                referenced_columns: vec![to],
                on_delete: row.get("on_delete")?,
            });
        } else if let Some(last) = foreign_keys.last_mut() {
            // seq > 0 marks a continuation row of a composite key.
            last.columns.push(from);
            last.referenced_columns.push(to);
        }
    }

    let mut indices = Vec::new();
    let mut stmt = conn.prepare(&format!("PRAGMA index_list('{table}');"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get("name")?;
        let origin: String = row.get("origin")?;
        // Only explicitly created indices participate in validation;
        // primary-key and unique-constraint autoindexes are engine
        // implementation details.
        if origin != "c" || name.starts_with("sqlite_autoindex") {
            continue;
        }
        let unique = row.get::<_, i64>("unique")? != 0;
        let mut columns = Vec::new();
        let mut info_stmt = conn.prepare(&format!("PRAGMA index_info('{name}');"))?;
        let mut info_rows = info_stmt.query([])?;
        while let Some(info_row) = info_rows.next()? {
            columns.push(info_row.get("name")?);
        }
        indices.push(IndexShape {
            name,
            columns,
            unique,
        });
    }

    Ok(TableShape {
        name: table.to_string(),
        columns,
        foreign_keys,
        indices,
    })
}

/// Compares the expected and physical shape of one table.
///
/// # Errors
/// Returns a human-readable expected-vs-found diff on any structural
/// difference. Column order is irrelevant; names, declared types,
/// nullability, primary-key position, defaults, foreign keys and
/// explicit indices all participate.
pub fn validate_table(expected: &TableShape, actual: &TableShape) -> Result<(), String> {
    let mut diffs = Vec::new();

    if actual.columns.is_empty() {
        return Err(format!("table `{}` not found in store", expected.name));
    }

    for expected_column in &expected.columns {
        match actual
            .columns
            .iter()
            .find(|candidate| candidate.name == expected_column.name)
        {
            None => diffs.push(format!(
                "{}: missing column `{}`",
                expected.name, expected_column.name
            )),
            Some(actual_column) => diff_column(&mut diffs, expected, expected_column, actual_column),
        }
    }
    for actual_column in &actual.columns {
        if !expected
            .columns
            .iter()
            .any(|candidate| candidate.name == actual_column.name)
        {
            diffs.push(format!(
                "{}: unexpected column `{}`",
                expected.name, actual_column.name
            ));
        }
    }

    let mut expected_fks = expected.foreign_keys.clone();
    let mut actual_fks = actual.foreign_keys.clone();
    expected_fks.sort();
    actual_fks.sort();
    if expected_fks != actual_fks {
        diffs.push(format!(
            "{}: expected foreign keys {:?}, found {:?}",
            expected.name, expected_fks, actual_fks
        ));
    }

    let mut expected_indices = expected.indices.clone();
    let mut actual_indices = actual.indices.clone();
    expected_indices.sort();
    actual_indices.sort();
    if expected_indices != actual_indices {
        diffs.push(format!(
            "{}: expected indices {:?}, found {:?}",
            expected.name, expected_indices, actual_indices
        ));
    }

    if diffs.is_empty() {
        Ok(())
    } else {
        Err(diffs.join("; "))
    }
}

fn diff_column(
    diffs: &mut Vec<String>,
    table: &TableShape,
    expected: &ColumnShape,
    actual: &ColumnShape,
) {
    if !expected.type_name.eq_ignore_ascii_case(&actual.type_name) {
        diffs.push(format!(
            "{}.{}: expected type {}, found {}",
            table.name, expected.name, expected.type_name, actual.type_name
        ));
    }
    if expected.not_null != actual.not_null {
        diffs.push(format!(
            "{}.{}: expected notnull={}, found notnull={}",
            table.name, expected.name, expected.not_null, actual.not_null
        ));
    }
    if expected.pk_ordinal != actual.pk_ordinal {
        diffs.push(format!(
            "{}.{}: expected pk ordinal {}, found {}",
            table.name, expected.name, expected.pk_ordinal, actual.pk_ordinal
        ));
    }
    if expected.default != actual.default {
        diffs.push(format!(
            "{}.{}: expected default {:?}, found {:?}",
            table.name, expected.name, expected.default, actual.default
        ));
    }
}

/// Reads the digest persisted by the last successful open, if any.
pub fn read_persisted_digest(conn: &Connection) -> DbResult<Option<String>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT digest FROM {SCHEMA_MASTER_TABLE} WHERE id = ?1;"
    ))?;
    let mut rows = stmt.query([SCHEMA_MASTER_ROW_ID])?;
    match rows.next()? {
        Some(row) => Ok(Some(row.get(0)?)),
        None => Ok(None),
    }
}

/// Persists `digest` as the store's schema identity.
pub fn write_persisted_digest(conn: &Connection, digest: &str) -> DbResult<()> {
    conn.execute(
        &format!("INSERT OR REPLACE INTO {SCHEMA_MASTER_TABLE} (id, digest) VALUES (?1, ?2);"),
        rusqlite::params![SCHEMA_MASTER_ROW_ID, digest],
    )?;
    Ok(())
}
