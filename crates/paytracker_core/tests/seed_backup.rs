use paytracker_core::db::open_db_in_memory;
use paytracker_core::{
    ensure_seed, export_snapshot, import_snapshot, Client, ClientRepository, PaymentRepository,
    PaymentStatus, Snapshot,
};

#[tokio::test]
async fn ensure_seed_populates_an_empty_store() {
    let db = open_db_in_memory().unwrap();
    ensure_seed(&db).await.unwrap();

    let clients = db.client_repo().list().await.unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].name, "Juan Dela Cruz");

    let payments = db.payment_repo().list().await.unwrap();
    assert_eq!(payments.len(), 2);
    assert!(payments
        .iter()
        .any(|payment| payment.status == PaymentStatus::Paid));
    assert!(payments
        .iter()
        .any(|payment| payment.status == PaymentStatus::Pending));
}

#[tokio::test]
async fn ensure_seed_is_idempotent() {
    let db = open_db_in_memory().unwrap();
    ensure_seed(&db).await.unwrap();
    ensure_seed(&db).await.unwrap();

    assert_eq!(db.client_repo().list().await.unwrap().len(), 1);
    assert_eq!(db.payment_repo().list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn seed_skips_stores_that_already_have_clients() {
    let db = open_db_in_memory().unwrap();
    let existing = Client::new("Existing", "existing@example.com");
    db.client_repo().upsert(&existing).await.unwrap();

    ensure_seed(&db).await.unwrap();

    let clients = db.client_repo().list().await.unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].name, "Existing");
    assert!(db.payment_repo().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn snapshot_roundtrips_through_json() {
    let source = open_db_in_memory().unwrap();
    ensure_seed(&source).await.unwrap();

    let snapshot = export_snapshot(&source).await.unwrap();
    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"clients\""));
    assert!(json.contains("\"clientId\""));
    assert!(json.contains("\"createdAt\""));
    let restored: Snapshot = serde_json::from_str(&json).unwrap();

    let target = open_db_in_memory().unwrap();
    import_snapshot(&target, &restored).await.unwrap();

    assert_eq!(
        target.client_repo().list().await.unwrap(),
        source.client_repo().list().await.unwrap()
    );
    assert_eq!(
        target.payment_repo().list().await.unwrap(),
        source.payment_repo().list().await.unwrap()
    );
}

#[tokio::test]
async fn import_replaces_existing_contents() {
    let db = open_db_in_memory().unwrap();
    let stale = Client::new("Stale", "stale@example.com");
    db.client_repo().upsert(&stale).await.unwrap();

    let fresh = Client::new("Fresh", "fresh@example.com");
    let snapshot = Snapshot {
        clients: vec![fresh.clone()],
        payments: Vec::new(),
    };
    import_snapshot(&db, &snapshot).await.unwrap();

    let clients = db.client_repo().list().await.unwrap();
    assert_eq!(clients, vec![fresh]);
}

#[tokio::test]
async fn import_of_invalid_snapshot_changes_nothing() {
    let db = open_db_in_memory().unwrap();
    let kept = Client::new("Kept", "kept@example.com");
    db.client_repo().upsert(&kept).await.unwrap();

    let mut bad_client = Client::new("Bad", "bad@example.com");
    bad_client.email = String::new();
    let snapshot = Snapshot {
        clients: vec![bad_client],
        payments: Vec::new(),
    };
    assert!(import_snapshot(&db, &snapshot).await.is_err());

    assert_eq!(db.client_repo().list().await.unwrap(), vec![kept]);
}
