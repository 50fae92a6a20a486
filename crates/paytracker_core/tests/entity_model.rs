use paytracker_core::model::ValidationError;
use paytracker_core::{Client, Payment, PaymentStatus};

#[test]
fn new_client_has_generated_id_and_timestamp() {
    let client = Client::new("Acme", "a@x.com");
    assert!(!client.id.is_empty());
    assert!(client.created_at > 0);
    assert!(client.company.is_none());
    assert!(client.validate().is_ok());
}

#[test]
fn client_validation_requires_name_and_email() {
    let mut client = Client::new("Acme", "a@x.com");
    client.name = "   ".to_string();
    assert!(matches!(
        client.validate(),
        Err(ValidationError::EmptyField {
            entity: "client",
            field: "name",
        })
    ));
}

#[test]
fn new_payment_defaults_to_pending_and_unpaid() {
    let payment = Payment::new("c1", "INV-1", 99.5, 1_000);
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert!(payment.paid_date.is_none());
    assert!(payment.validate().is_ok());
}

#[test]
fn payment_validation_rejects_non_finite_amounts() {
    let mut payment = Payment::new("c1", "INV-1", 1.0, 1_000);
    payment.amount = f64::NAN;
    assert!(matches!(
        payment.validate(),
        Err(ValidationError::NonFiniteAmount)
    ));

    payment.amount = f64::INFINITY;
    assert!(matches!(
        payment.validate(),
        Err(ValidationError::NonFiniteAmount)
    ));
}

#[test]
fn payment_status_storage_representation_roundtrips() {
    for status in [
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        PaymentStatus::Overdue,
    ] {
        assert_eq!(PaymentStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(PaymentStatus::parse("partially-paid"), None);
}

#[test]
fn entities_serialize_with_on_disk_column_names() {
    let mut payment = Payment::new("c1", "INV-1", 1.0, 1_000);
    payment.id = "p1".to_string();
    payment.created_at = 1_500;

    let json = serde_json::to_value(&payment).unwrap();
    assert_eq!(json["clientId"], "c1");
    assert_eq!(json["invoiceNumber"], "INV-1");
    assert_eq!(json["createdAt"], 1_500);
    assert_eq!(json["status"], "pending");
    assert!(json["paidDate"].is_null());
}
