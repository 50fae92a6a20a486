use paytracker_core::db::{open_db, open_db_in_memory};
use paytracker_core::{Client, ClientRepository, Payment, PaymentRepository, Table};

async fn populate(db: &paytracker_core::Database) {
    let client = Client::new("Acme", "a@x.com");
    db.client_repo().upsert(&client).await.unwrap();
    db.payment_repo()
        .upsert(&Payment::new(&client.id, "INV-1", 250.0, 2_000))
        .await
        .unwrap();
}

#[tokio::test]
async fn clear_all_empties_every_table() {
    let db = open_db_in_memory().unwrap();
    populate(&db).await;

    db.clear_all().await.unwrap();

    assert!(db.client_repo().list().await.unwrap().is_empty());
    assert!(db.payment_repo().list().await.unwrap().is_empty());
    assert!(db.payment_repo().list_with_client().await.unwrap().is_empty());
}

#[tokio::test]
async fn clear_all_notifies_observers_of_both_tables() {
    let db = open_db_in_memory().unwrap();
    populate(&db).await;

    let rx = db.tracker().subscribe(&[Table::Clients, Table::Payments]);
    db.clear_all().await.unwrap();

    let tables: Vec<_> = rx.try_iter().map(|event| event.table).collect();
    assert!(tables.contains(&Table::Clients));
    assert!(tables.contains(&Table::Payments));
}

#[tokio::test]
async fn cleared_store_reopens_and_accepts_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paytracker.db");

    {
        let db = open_db(&path).unwrap();
        populate(&db).await;
        db.clear_all().await.unwrap();
    }

    // The digest row survives the wipe, so reopening validates cleanly.
    let db = open_db(&path).unwrap();
    assert!(db.client_repo().list().await.unwrap().is_empty());
    populate(&db).await;
    assert_eq!(db.client_repo().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn clear_all_restores_foreign_key_enforcement() {
    let db = open_db_in_memory().unwrap();
    populate(&db).await;
    db.clear_all().await.unwrap();

    let orphan = Payment::new("no-such-client", "INV-9", 10.0, 1_000);
    assert!(db.payment_repo().upsert(&orphan).await.is_err());
}
