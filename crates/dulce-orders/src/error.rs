//! # Coordinator Error Types
//!
//! Failures surfaced by the submission and kitchen coordinators. Nothing
//! here is fatal: submission errors leave the ticket intact for another try,
//! and transition errors just re-enable the control that requested them.

use thiserror::Error;

use dulce_core::order::OrderStatus;
use dulce_store::StoreError;

// =============================================================================
// Submit Error
// =============================================================================

/// Why a ticket submission did not produce an order.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Nothing on the ticket; there is no order to create.
    #[error("cannot submit an empty ticket")]
    EmptyTicket,

    /// Every attempt lost the counter race. The ticket is untouched; the
    /// operator can simply press submit again.
    #[error("submission failed after {attempts} attempt(s)")]
    RetriesExhausted { attempts: u32 },

    /// A non-retryable store failure (offline, missing document).
    #[error(transparent)]
    Store(#[from] StoreError),
}

// =============================================================================
// Transition Error
// =============================================================================

/// Why a kitchen status change was rejected.
#[derive(Debug, Error)]
pub enum TransitionError {
    /// The order is not in a status this transition starts from. Happens
    /// when two displays race on the same card; the loser just sees the
    /// card move.
    #[error("order '{id}' cannot move {from} -> {to}")]
    Illegal {
        id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// The order left the view before the request landed.
    #[error("order '{id}' is no longer on the board")]
    NotOnBoard { id: String },

    /// The coordinator task is not running.
    #[error("kitchen coordinator is not running")]
    Unavailable,

    #[error(transparent)]
    Store(#[from] StoreError),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = SubmitError::RetriesExhausted { attempts: 5 };
        assert_eq!(err.to_string(), "submission failed after 5 attempt(s)");

        let err = TransitionError::Illegal {
            id: "abc".to_string(),
            from: OrderStatus::Preparing,
            to: OrderStatus::Preparing,
        };
        assert_eq!(err.to_string(), "order 'abc' cannot move PREPARING -> PREPARING");
    }

    #[test]
    fn test_store_errors_convert() {
        let err: SubmitError = StoreError::Offline.into();
        assert!(matches!(err, SubmitError::Store(StoreError::Offline)));
    }
}
