//! Domain model for client and payment records.
//!
//! # Responsibility
//! - Define the canonical entity structures persisted by the core.
//! - Provide write-path validation shared by every repository.
//!
//! # Invariants
//! - Every entity is identified by a stable string `id` that is never
//!   reused or mutated after creation.
//! - `created_at` is assigned once at construction; later upserts must
//!   carry the original value forward.
//!
//! # See also
//! - docs/architecture/data-model.md

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod client;
pub mod payment;

/// Validation failure raised before any SQL executes on a write path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required string field is empty.
    EmptyField {
        entity: &'static str,
        field: &'static str,
    },
    /// A payment amount is NaN or infinite and cannot be persisted.
    NonFiniteAmount,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { entity, field } => {
                write!(f, "{entity}.{field} must not be empty")
            }
            Self::NonFiniteAmount => write!(f, "payment.amount must be a finite number"),
        }
    }
}

impl Error for ValidationError {}

/// Current wall-clock instant in epoch milliseconds.
pub(crate) fn epoch_ms_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}

pub(crate) fn require_non_empty(
    value: &str,
    entity: &'static str,
    field: &'static str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { entity, field });
    }
    Ok(())
}
