//! First-run demo data.
//!
//! # Responsibility
//! - Populate an empty store with one demo client and two payments so
//!   a fresh install has something to show.
//!
//! # Invariants
//! - Seeding is a no-op whenever any client already exists.

use log::info;

use crate::db::Database;
use crate::model::client::Client;
use crate::model::payment::{Payment, PaymentStatus};
use crate::model::epoch_ms_now;
use crate::repo::{client_repo::ClientRepository, payment_repo::PaymentRepository, RepoResult};

const DAY_MS: i64 = 86_400_000;

/// Seeds demo data when the store has no clients yet.
pub async fn ensure_seed(db: &Database) -> RepoResult<()> {
    let clients = db.client_repo();
    if !clients.list().await?.is_empty() {
        return Ok(());
    }

    let client = Client::new("Juan Dela Cruz", "juan@example.com");
    clients.upsert(&client).await?;

    let payments = db.payment_repo();
    let now = epoch_ms_now();

    let mut pending = Payment::new(&client.id, "INV-1001", 1500.0, now + 7 * DAY_MS);
    pending.description = Some("Website design initial fee".to_string());
    payments.upsert(&pending).await?;

    let mut settled = Payment::new(&client.id, "INV-0998", 2500.0, now - 20 * DAY_MS);
    settled.paid_date = Some(now - 15 * DAY_MS);
    settled.status = PaymentStatus::Paid;
    settled.description = Some("Consulting retainer".to_string());
    payments.upsert(&settled).await?;

    info!("event=seed module=service status=ok clients=1 payments=2");
    Ok(())
}
