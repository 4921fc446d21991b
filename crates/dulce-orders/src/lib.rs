//! # dulce-orders: Submission + Kitchen Lifecycle Coordinators
//!
//! Event-driven orchestration between the registers, the shared store and
//! the kitchen display.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Register front end                    Kitchen display front end       │
//! │        │ submit(ticket)                      │ taps, board renders      │
//! │  ┌─────▼──────────────────┐        ┌─────────▼─────────────────────┐   │
//! │  │ SubmissionCoordinator  │        │  KitchenHandle                │   │
//! │  │  bounded CAS retry     │        │    │ mpsc commands            │   │
//! │  │  loop over the counter │        │  ┌─▼─────────────────────┐    │   │
//! │  └─────┬──────────────────┘        │  │ KitchenCoordinator    │    │   │
//! │        │                          │  │  select! run loop     │    │   │
//! │        │                          │  │  view + timers +      │    │   │
//! │        │                          │  │  reconcile sweep      │    │   │
//! │        │                          │  └─┬─────────────────────┘    │   │
//! │        │                          └────┼──────────────────────────┘   │
//! │  ┌─────▼───────────────────────────────▼─────┐                         │
//! │  │          dulce-store (OrderStore)         │                         │
//! │  │    counter transaction + change feed      │                         │
//! │  └───────────────────────────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`submit`] - Ticket submission with optimistic counter retries
//! - [`lifecycle`] - The kitchen display run loop
//! - [`config`] - Runtime tunables for both coordinators
//! - [`error`] - Coordinator error types

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod submit;

pub use config::OrdersConfig;
pub use error::{SubmitError, TransitionError};
pub use lifecycle::{spawn, KitchenCard, KitchenHandle, KitchenSnapshot};
pub use submit::SubmissionCoordinator;
