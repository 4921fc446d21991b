//! # Store Error Types
//!
//! Failures raised by the document store. Transaction conflicts are the
//! interesting case: they are EXPECTED under concurrent submission and the
//! submission coordinator retries them; everything else surfaces to the
//! operator.

use thiserror::Error;

// =============================================================================
// Store Error
// =============================================================================

/// Errors from the shared document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The counter document changed between read and commit. Retryable:
    /// re-read the counter and try again with the fresh version.
    #[error("counter transaction conflict: expected version {expected}, found {actual}")]
    Conflict { expected: u64, actual: u64 },

    /// No document with this id.
    #[error("order '{id}' not found")]
    NotFound { id: String },

    /// The store is unreachable (connectivity fault). The kitchen display
    /// shows its offline indicator while this persists.
    #[error("store is offline")]
    Offline,

    /// A catalog collection failed to deserialize.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether the submission coordinator should re-read and retry.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Result alias used throughout the store.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
