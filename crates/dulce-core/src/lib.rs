//! # dulce-core: Pure Business Logic for Dulce Crepa POS
//!
//! This crate is the **heart** of the register and kitchen system. It
//! contains the menu catalog, the selection/pricing engines, the ticket, and
//! the order document shapes, all as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Dulce Crepa POS Architecture                       │
//! │                                                                         │
//! │  ┌──────────────────────────┐        ┌──────────────────────────┐      │
//! │  │    Register Front End    │        │   Kitchen Display (KDS)  │      │
//! │  │  menu ► customize ► pay  │        │  cards ► prep ► deliver  │      │
//! │  └────────────┬─────────────┘        └────────────┬─────────────┘      │
//! │               │                                   │                    │
//! │  ┌────────────▼───────────────────────────────────▼─────────────┐      │
//! │  │                 dulce-orders (Coordinators)                  │      │
//! │  │     submission retry loop • kitchen lifecycle • timers       │      │
//! │  └────────────┬───────────────────────────────────┬─────────────┘      │
//! │               │                                   │                    │
//! │  ┌────────────▼───────────────────────────────────▼─────────────┐      │
//! │  │                ★ dulce-core (THIS CRATE) ★                   │      │
//! │  │                                                              │      │
//! │  │  ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐ ┌───────┐  │      │
//! │  │  │ catalog │ │selection│ │ pricing  │ │ ticket │ │ order │  │      │
//! │  │  │snapshot │ │ toggle  │ │ evaluate │ │ freeze │ │ doc   │  │      │
//! │  │  └─────────┘ └─────────┘ └──────────┘ └────────┘ └───────┘  │      │
//! │  │                                                              │      │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │      │
//! │  └────────────┬─────────────────────────────────────────────────┘      │
//! │               │                                                        │
//! │  ┌────────────▼─────────────────────────────────────────────────┐      │
//! │  │              dulce-store (Shared Document Store)             │      │
//! │  │      counter transactions, live queries, subscriptions       │      │
//! │  └──────────────────────────────────────────────────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`catalog`] - Validated menu snapshot (groups, items, modifiers, rules)
//! - [`selection`] - Working modifier set with exclusive-toggle semantics
//! - [`pricing`] - The composition-rule pricing/validation engine
//! - [`ticket`] - The register's in-progress order with frozen lines
//! - [`order`] - Submitted order documents and the status lifecycle
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic, same input = same output
//! 2. **No I/O**: database, network, clock and file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are cents (i64) to avoid float errors
//! 4. **Decide Shape Once**: ambiguity (item shapes, composition kinds) is resolved
//!    at catalog ingestion; downstream code matches on tags, never probes fields
//!
//! ## Example Usage
//!
//! ```rust
//! use dulce_core::catalog::{Composition, Modifier, PriceRule, PriceTier};
//! use dulce_core::money::Money;
//! use dulce_core::pricing::{evaluate, PricingDescriptor};
//! use dulce_core::selection::SelectionSet;
//!
//! let rule = PriceRule {
//!     id: "crepe_rule".into(),
//!     name: "Crepe Bases".into(),
//!     tiers: vec![
//!         PriceTier { count: 1, price: Money::from_cents(4000) },
//!         PriceTier { count: 2, price: Money::from_cents(5500) },
//!     ],
//! };
//! let descriptor = PricingDescriptor {
//!     name: "Build Your Own Crepe".into(),
//!     composition: Composition::ThresholdCount,
//!     fixed_price: Money::zero(),
//!     base_group: "sweet_crepe_base".into(),
//!     dependent_group: None,
//! };
//! let nutella = Modifier {
//!     id: "nutella".into(),
//!     name: "Nutella".into(),
//!     price: Money::zero(),
//!     group: "sweet_crepe_base".into(),
//!     exempt_from_dependent: false,
//! };
//!
//! let selection = SelectionSet::new().toggle(&nutella, false);
//! let quote = evaluate(&descriptor, Some(&rule), &selection);
//!
//! assert!(quote.valid);
//! assert_eq!(quote.price, Money::from_cents(4000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod money;
pub mod order;
pub mod pricing;
pub mod selection;
pub mod ticket;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use dulce_core::Money` instead of
// `use dulce_core::money::Money`

pub use catalog::{
    CatalogSnapshot, Composition, FixedItem, MenuGroup, MenuItem, Modifier, PriceRule, PriceTier,
    RawMenuItem, Variant, VariantItem,
};
pub use error::{CatalogError, ValidationError, ValidationResult};
pub use money::Money;
pub use order::{Order, OrderMode, OrderStatus};
pub use pricing::{evaluate, evaluate_variant, PricingDescriptor, Quote};
pub use selection::SelectionSet;
pub use ticket::{FrozenModifier, LineKind, Ticket, TicketLineItem};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Document id of the shared daily order counter.
///
/// ## Why a constant?
/// Every register transacts against the SAME counter document so daily order
/// numbers stay unique and gapless across devices. There is exactly one.
pub const ORDER_COUNTER_ID: &str = "daily_order_counter";

/// Kitchen display cards older than this many minutes are flagged late.
///
/// ## Business Reason
/// A crepe that has waited ten minutes needs attention before the customer
/// asks for it. The display highlights the card and its elapsed timer.
pub const LATE_ORDER_THRESHOLD_MINUTES: i64 = 10;
