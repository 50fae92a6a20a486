//! Use-case services layered on top of the repositories.
//!
//! # Responsibility
//! - Provide first-run seeding and whole-store snapshot workflows.
//!
//! # Invariants
//! - Services never bypass repository validation or the invalidation
//!   contract, except where a whole-store replace is documented to
//!   manage its own transaction.

pub mod backup;
pub mod seed;
