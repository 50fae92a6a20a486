//! Payment domain model.
//!
//! # Responsibility
//! - Define the invoice/payment obligation owed by a client.
//! - Define the read-only payment+client projection used by list views.
//!
//! # Invariants
//! - `client_id` must reference an existing client at commit time; the
//!   storage layer enforces this with a cascading foreign key.
//! - `paid_date = None` means the payment is still outstanding.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{epoch_ms_now, require_non_empty, ValidationError};

/// Lifecycle tag for a payment obligation.
///
/// Stored as lowercase TEXT; unknown persisted values are rejected on
/// read instead of being round-tripped as opaque strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
}

impl PaymentStatus {
    /// Stable storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }

    /// Parses the storage representation. Returns `None` for unknown
    /// values so callers can surface a corrupt-data error.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "overdue" => Some(Self::Overdue),
            _ => None,
        }
    }
}

/// Invoice/payment obligation owed by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Stable global ID used as primary key.
    pub id: String,
    /// Owning client; foreign key to `clients.id`.
    pub client_id: String,
    pub invoice_number: String,
    pub amount: f64,
    /// Due instant in epoch milliseconds.
    pub due_date: i64,
    /// Settlement instant in epoch milliseconds; `None` while unpaid.
    pub paid_date: Option<i64>,
    pub status: PaymentStatus,
    pub description: Option<String>,
    /// Creation instant in epoch milliseconds. Set once, carried forward
    /// verbatim by every later upsert.
    pub created_at: i64,
}

impl Payment {
    /// Creates a new pending payment with a generated stable ID and the
    /// current creation timestamp.
    pub fn new(
        client_id: impl Into<String>,
        invoice_number: impl Into<String>,
        amount: f64,
        due_date: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            client_id: client_id.into(),
            invoice_number: invoice_number.into(),
            amount,
            due_date,
            paid_date: None,
            status: PaymentStatus::Pending,
            description: None,
            created_at: epoch_ms_now(),
        }
    }

    /// Checks required-field invariants before persistence.
    ///
    /// # Errors
    /// - `ValidationError::EmptyField` when `id`, `client_id` or
    ///   `invoice_number` is empty.
    /// - `ValidationError::NonFiniteAmount` when `amount` is NaN or
    ///   infinite.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&self.id, "payment", "id")?;
        require_non_empty(&self.client_id, "payment", "clientId")?;
        require_non_empty(&self.invoice_number, "payment", "invoiceNumber")?;
        if !self.amount.is_finite() {
            return Err(ValidationError::NonFiniteAmount);
        }
        Ok(())
    }
}

/// A payment joined with its owning client's name.
///
/// Constructed per query by the inner join in the payment repository;
/// never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentWithClient {
    pub payment: Payment,
    pub client_name: String,
}
