//! # dulce-store: Shared Document Store
//!
//! The persistence seam between the registers and the kitchen display: order
//! documents, the transactional daily counter, and a live change feed.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Register A ─┐                                 ┌─ Kitchen Display      │
//! │   Register B ─┼──► dulce-orders coordinators ───┤                       │
//! │               │                                 │                       │
//! │  ┌────────────▼─────────────────────────────────▼─────────────┐        │
//! │  │                 ★ dulce-store (THIS CRATE) ★               │        │
//! │  │                                                            │        │
//! │  │   ┌──────────────┐  ┌──────────────┐  ┌────────────────┐  │        │
//! │  │   │    orders    │  │   catalog    │  │      seed      │  │        │
//! │  │   │ CAS counter  │  │ JSON loader  │  │  sample menu   │  │        │
//! │  │   │ change feed  │  │ (load once)  │  │                │  │        │
//! │  │   └──────────────┘  └──────────────┘  └────────────────┘  │        │
//! │  └────────────────────────────────────────────────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! 1. **Gapless numbers**: the counter moves only inside a successful
//!    commit; a conflicted attempt burns nothing
//! 2. **Whole-document events**: the feed never emits a partial patch
//! 3. **Store is truth**: a lagged feed consumer resyncs from
//!    [`OrderStore::active_orders`]

pub mod catalog;
pub mod error;
pub mod orders;
pub mod seed;

pub use catalog::load_catalog;
pub use error::{StoreError, StoreResult};
pub use orders::{CounterSnapshot, OrderEvent, OrderFeed, OrderStore};
pub use seed::sample_catalog;
