//! Client domain model.
//!
//! # Responsibility
//! - Define the customer/contact record owned by the `clients` table.
//!
//! # Invariants
//! - `id` is stable and never reused for another client.
//! - `name` and `email` are required; the remaining contact fields are
//!   optional.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{epoch_ms_now, require_non_empty, ValidationError};

/// Customer/contact record.
///
/// Field names serialize in camelCase to match the on-disk column names
/// and the snapshot interchange format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Stable global ID used as primary key and payment foreign key.
    pub id: String,
    pub name: String,
    pub company: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Creation instant in epoch milliseconds. Set once, carried forward
    /// verbatim by every later upsert.
    pub created_at: i64,
}

impl Client {
    /// Creates a new client with a generated stable ID and the current
    /// creation timestamp.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            company: None,
            email: email.into(),
            phone: None,
            address: None,
            created_at: epoch_ms_now(),
        }
    }

    /// Checks required-field invariants before persistence.
    ///
    /// # Errors
    /// - `ValidationError::EmptyField` when `id`, `name` or `email` is
    ///   empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&self.id, "client", "id")?;
        require_non_empty(&self.name, "client", "name")?;
        require_non_empty(&self.email, "client", "email")?;
        Ok(())
    }
}
