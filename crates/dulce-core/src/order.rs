//! # Order Documents
//!
//! The submitted-order shape shared by the register, the store, and the
//! kitchen display.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   PENDING ──────► PREPARING ──────► READY ──────► DELIVERED             │
//! │      │                                ▲                                 │
//! │      └────────────────────────────────┘                                 │
//! │              (direct, when the kitchen skips "preparing")               │
//! │                                                                         │
//! │   DELIVERED is terminal. The kitchen display shows every non-DELIVERED  │
//! │   order; delivered orders age out of the store on their own.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An order is a frozen snapshot: once submitted, its lines, total and
//! number never change. Only `status` (and the ready timestamp) move.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::ticket::{Ticket, TicketLineItem};

// =============================================================================
// Status
// =============================================================================

/// Kitchen lifecycle state of a submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Delivered,
}

impl OrderStatus {
    /// Whether this status keeps the order on the kitchen display.
    #[inline]
    pub fn is_active(&self) -> bool {
        !matches!(self, OrderStatus::Delivered)
    }

    /// Legal forward transitions. The lifecycle only moves toward DELIVERED;
    /// Ready may be reached directly from Pending when the kitchen skips the
    /// preparing step.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Preparing) | (Pending, Ready) | (Preparing, Ready) | (Ready, Delivered)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Delivered => "DELIVERED",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Mode
// =============================================================================

/// How the order will be handed over. Chosen once at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum OrderMode {
    DineIn,
    TakeOut,
}

impl std::fmt::Display for OrderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OrderMode::DineIn => "DINE IN",
            OrderMode::TakeOut => "TAKE OUT",
        })
    }
}

// =============================================================================
// Order
// =============================================================================

/// A submitted order document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    /// Document id, minted at submission.
    pub id: String,

    /// Customer-facing daily number from the shared counter. Unique and
    /// gapless across every register for the business day.
    pub order_number: u64,

    pub status: OrderStatus,
    pub mode: OrderMode,

    /// Submission timestamp; the kitchen display sorts ascending on this.
    pub created_at: DateTime<Utc>,

    /// Set when the order reaches READY; drives the auto-complete timer.
    #[serde(default)]
    pub ready_at: Option<DateTime<Utc>>,

    /// Frozen grand total, copied from the ticket at submission.
    pub total: Money,

    /// Frozen line items, in register append order.
    pub lines: Vec<TicketLineItem>,
}

impl Order {
    /// Freezes a non-empty ticket into a PENDING order document.
    ///
    /// The caller has already claimed `order_number` from the counter; this
    /// just snapshots the ticket around it.
    pub fn from_ticket(
        order_number: u64,
        mode: OrderMode,
        ticket: &Ticket,
        created_at: DateTime<Utc>,
    ) -> Self {
        Order {
            id: Uuid::new_v4().to_string(),
            order_number,
            status: OrderStatus::Pending,
            mode,
            created_at,
            ready_at: None,
            total: ticket.total(),
            lines: ticket.lines().to_vec(),
        }
    }

    /// Whole minutes elapsed since submission, clamped at zero for clock
    /// skew between devices.
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_minutes().max(0)
    }

    /// Modifier names on one line, grouped for the kitchen ticket:
    /// `(group tag, names in that group)` in first-seen order.
    pub fn line_modifier_groups(line: &TicketLineItem) -> Vec<(String, Vec<String>)> {
        let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
        for modifier in &line.modifiers {
            match grouped.iter_mut().find(|(g, _)| *g == modifier.group) {
                Some((_, names)) => names.push(modifier.name.clone()),
                None => grouped.push((modifier.group.clone(), vec![modifier.name.clone()])),
            }
        }
        grouped
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FixedItem;
    use chrono::Duration;

    fn ticket_with(names_and_cents: &[(&str, i64)]) -> Ticket {
        let mut ticket = Ticket::new();
        for &(name, cents) in names_and_cents {
            ticket.push(TicketLineItem::fixed(&FixedItem {
                id: name.to_lowercase(),
                name: name.to_string(),
                category: "desserts".to_string(),
                price: Money::from_cents(cents),
                modifier_groups: vec![],
            }));
        }
        ticket
    }

    #[test]
    fn test_legal_transitions() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Preparing));
        assert!(Pending.can_transition_to(Ready));
        assert!(Preparing.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Delivered));

        // No backwards or skipping-to-terminal moves.
        assert!(!Preparing.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Ready.can_transition_to(Preparing));
        assert!(!Delivered.can_transition_to(Pending));
    }

    #[test]
    fn test_delivered_is_the_only_inactive_status() {
        assert!(OrderStatus::Pending.is_active());
        assert!(OrderStatus::Preparing.is_active());
        assert!(OrderStatus::Ready.is_active());
        assert!(!OrderStatus::Delivered.is_active());
    }

    #[test]
    fn test_from_ticket_freezes_lines_and_total() {
        let ticket = ticket_with(&[("Brownie", 2500), ("Flan", 3000)]);
        let now = Utc::now();
        let order = Order::from_ticket(42, OrderMode::TakeOut, &ticket, now);

        assert_eq!(order.order_number, 42);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, Money::from_cents(5500));
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.created_at, now);
        assert!(order.ready_at.is_none());
    }

    #[test]
    fn test_elapsed_minutes_clamps_clock_skew() {
        let ticket = ticket_with(&[("Brownie", 2500)]);
        let created = Utc::now();
        let order = Order::from_ticket(1, OrderMode::DineIn, &ticket, created);

        assert_eq!(order.elapsed_minutes(created + Duration::minutes(11)), 11);
        // A display whose clock lags the register must not show negatives.
        assert_eq!(order.elapsed_minutes(created - Duration::minutes(2)), 0);
    }

    #[test]
    fn test_status_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Preparing).unwrap();
        assert_eq!(json, "\"PREPARING\"");
        let back: OrderStatus = serde_json::from_str("\"DELIVERED\"").unwrap();
        assert_eq!(back, OrderStatus::Delivered);
    }

    #[test]
    fn test_line_modifier_groups_preserve_first_seen_order() {
        use crate::ticket::{FrozenModifier, LineKind};
        let line = TicketLineItem {
            id: "line".to_string(),
            kind: LineKind::Custom,
            name: "Frappe".to_string(),
            price: Money::from_cents(5000),
            rule_label: "base price".to_string(),
            modifiers: vec![
                FrozenModifier {
                    name: "mocha".to_string(),
                    group: "frappe_flavors".to_string(),
                    price: Money::zero(),
                },
                FrozenModifier {
                    name: "whole milk".to_string(),
                    group: "milk_options".to_string(),
                    price: Money::zero(),
                },
                FrozenModifier {
                    name: "pearls".to_string(),
                    group: "frappe_extras".to_string(),
                    price: Money::from_cents(500),
                },
            ],
        };

        let grouped = Order::line_modifier_groups(&line);
        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[0].0, "frappe_flavors");
        assert_eq!(grouped[0].1, vec!["mocha".to_string()]);
        assert_eq!(grouped[1].0, "milk_options");
    }
}
