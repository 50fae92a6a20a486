//! Table change notification registry.
//!
//! # Responsibility
//! - Track which observers are interested in which tables.
//! - Notify them after every committed write that touched those tables.
//!
//! # Invariants
//! - Notifications fire strictly after commit, before the write call
//!   returns to its caller.
//! - Events carry no diff; observers re-query through the repositories.
//! - Disconnected observers are pruned on the next publish.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

/// Tables owned by this storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Clients,
    Payments,
}

impl Table {
    /// Stable table name as it appears in the schema.
    pub fn name(self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Payments => "payments",
        }
    }
}

/// Notification that a committed write changed `table`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidationEvent {
    pub table: Table,
}

struct Subscription {
    tables: Vec<Table>,
    tx: Sender<InvalidationEvent>,
}

/// Registry mapping tables to interested observers.
///
/// Shared process-wide through the database session; repositories call
/// [`InvalidationTracker::publish`] after each commit.
#[derive(Default)]
pub struct InvalidationTracker {
    subscriptions: Mutex<Vec<Subscription>>,
}

impl InvalidationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in the given tables.
    ///
    /// Returns the receiving end of a channel that yields one event per
    /// affected table per committed write. Dropping the receiver ends
    /// the subscription.
    pub fn subscribe(&self, tables: &[Table]) -> Receiver<InvalidationEvent> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subscriptions) = self.subscriptions.lock() {
            subscriptions.push(Subscription {
                tables: tables.to_vec(),
                tx,
            });
        }
        rx
    }

    /// Notifies every observer interested in any of `tables`.
    ///
    /// Called by repositories and the session strictly after commit.
    /// Subscriptions whose receiver was dropped are removed.
    pub fn publish(&self, tables: &[Table]) {
        let mut subscriptions = match self.subscriptions.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };

        subscriptions.retain(|subscription| {
            for table in tables {
                if subscription.tables.contains(table)
                    && subscription
                        .tx
                        .send(InvalidationEvent { table: *table })
                        .is_err()
                {
                    return false;
                }
            }
            true
        });
    }
}
