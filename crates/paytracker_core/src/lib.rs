//! Core data-access layer for PayTracker.
//! This crate is the single source of truth for persistence invariants.

pub mod db;
pub mod invalidation;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, Database, DbError, DbResult};
pub use invalidation::{InvalidationEvent, InvalidationTracker, Table};
pub use logging::{default_log_level, init_logging};
pub use model::client::Client;
pub use model::payment::{Payment, PaymentStatus, PaymentWithClient};
pub use model::ValidationError;
pub use repo::client_repo::{ClientRepository, SqliteClientRepository};
pub use repo::payment_repo::{PaymentRepository, SqlitePaymentRepository};
pub use repo::{RepoError, RepoResult};
pub use service::backup::{export_snapshot, import_snapshot, Snapshot};
pub use service::seed::ensure_seed;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
