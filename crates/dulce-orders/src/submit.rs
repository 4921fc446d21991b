//! # Submission Coordinator
//!
//! Turns a non-empty ticket into a numbered order through the store's
//! optimistic counter transaction.
//!
//! ## Retry Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  attempt = 1 .. max_submit_attempts                                     │
//! │                                                                         │
//! │    read counter snapshot (value, version)                               │
//! │    freeze ticket into a PENDING order carrying value+1                  │
//! │    commit(snapshot, order)                                              │
//! │       ├── ok        ──► clear ticket, return order                      │
//! │       ├── Conflict  ──► warn, next attempt with a FRESH snapshot        │
//! │       └── other     ──► return the store error                          │
//! │                                                                         │
//! │  exhausted ──► RetriesExhausted (ticket untouched)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ticket is cleared only on the success path, so any failure leaves the
//! register exactly where it was and the operator can just press submit
//! again.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use dulce_core::order::{Order, OrderMode};
use dulce_core::ticket::Ticket;
use dulce_store::OrderStore;

use crate::config::OrdersConfig;
use crate::error::SubmitError;

// =============================================================================
// Submission Coordinator
// =============================================================================

/// Submits tickets against the shared store. One per register; cheap to
/// clone since the store is shared behind an `Arc`.
#[derive(Clone)]
pub struct SubmissionCoordinator {
    store: Arc<OrderStore>,
    max_attempts: u32,
}

impl SubmissionCoordinator {
    pub fn new(store: Arc<OrderStore>, config: &OrdersConfig) -> Self {
        SubmissionCoordinator {
            store,
            max_attempts: config.max_submit_attempts,
        }
    }

    /// Submits the ticket, claiming the next daily order number.
    ///
    /// On success the ticket is cleared and the committed order (with its
    /// authoritative number) is returned. On ANY failure the ticket is left
    /// untouched.
    pub fn submit(&self, ticket: &mut Ticket, mode: OrderMode) -> Result<Order, SubmitError> {
        if ticket.is_empty() {
            return Err(SubmitError::EmptyTicket);
        }

        for attempt in 1..=self.max_attempts {
            let snapshot = self.store.counter_snapshot()?;
            let order = Order::from_ticket(snapshot.next_number(), mode, ticket, Utc::now());

            match self.store.commit_submission(snapshot, order) {
                Ok(committed) => {
                    info!(
                        number = committed.order_number,
                        lines = committed.lines.len(),
                        total = %committed.total,
                        attempt,
                        "ticket submitted"
                    );
                    ticket.clear();
                    return Ok(committed);
                }
                Err(err) if err.is_retryable() => {
                    warn!(attempt, max = self.max_attempts, %err, "counter conflict, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(SubmitError::RetriesExhausted {
            attempts: self.max_attempts,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
