//! # Error Types
//!
//! Domain-specific error types for dulce-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  dulce-core errors (this file)                                          │
//! │  ├── CatalogError     - Invariant violations at catalog ingestion       │
//! │  └── ValidationError  - Incomplete/conflicting customizations           │
//! │                                                                         │
//! │  dulce-store errors (separate crate)                                    │
//! │  └── StoreError       - Transaction conflicts, connectivity             │
//! │                                                                         │
//! │  dulce-orders errors (separate crate)                                   │
//! │  ├── SubmitError      - Retry exhaustion, empty tickets                 │
//! │  └── TransitionError  - Rejected status transitions                     │
//! │                                                                         │
//! │  Flow: ValidationError blocks "add to ticket" INLINE; it never          │
//! │  reaches the store. Store/coordinator errors surface to the operator.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (group id, modifier group, etc.)
//! 3. Errors are enum variants, never String
//! 4. Every variant maps to an operator-facing message

use thiserror::Error;

// =============================================================================
// Catalog Error
// =============================================================================

/// Errors raised while ingesting the raw catalog collections into a snapshot.
///
/// These are configuration errors in the menu data itself. They abort the
/// session load; a catalog that fails ingestion is never partially usable.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A menu group references a price rule id that is not in the rules
    /// collection.
    #[error("group '{group_id}' references unknown price rule '{rule_id}'")]
    DanglingPriceRule { group_id: String, rule_id: String },

    /// A raw item record carried both a fixed price and a variants list, or
    /// neither. The item shape is decided exactly once, here.
    #[error("item '{item_id}' has an ambiguous shape: {reason}")]
    AmbiguousItemShape { item_id: String, reason: String },

    /// A price rule declared two tiers with the same required count.
    #[error("price rule '{rule_id}' has duplicate tier count {count}")]
    DuplicateTierCount { rule_id: String, count: u32 },

    /// A price rule has no tiers at all.
    #[error("price rule '{rule_id}' has no tiers")]
    EmptyPriceRule { rule_id: String },

    /// A modifier carried a negative price.
    #[error("modifier '{modifier_id}' has a negative price")]
    NegativeModifierPrice { modifier_id: String },

    /// A customizable group is missing the data its composition kind needs
    /// (fixed price for exclusive-choice, price rule for counted kinds).
    #[error("group '{group_id}' is misconfigured: {reason}")]
    MisconfiguredGroup { group_id: String, reason: String },

    /// A collection contained two records with the same id.
    #[error("duplicate {collection} id '{id}'")]
    DuplicateId { collection: &'static str, id: String },

    /// A raw collection failed to parse.
    #[error("failed to parse {collection} collection: {message}")]
    Parse {
        collection: &'static str,
        message: String,
    },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Customization validation errors.
///
/// These occur when an operator tries to add an incomplete or conflicting
/// customization to the ticket. They are recoverable and surfaced inline next
/// to the affected control; the only thing they block is "add to ticket".
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The current selection does not satisfy the item's composition rules.
    /// `reason` is the same human-readable text the pricing engine reports.
    #[error("selection is not valid: {reason}")]
    InvalidSelection { reason: String },

    /// A required-exclusive modifier group has no selection yet.
    #[error("must select exactly one option from '{group}'")]
    MissingRequiredGroup { group: String },

    /// The ticket line id was not found (stale removal request).
    #[error("ticket line '{line_id}' not found")]
    LineNotFound { line_id: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with ValidationError.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================
