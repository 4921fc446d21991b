//! # Ticket
//!
//! The in-progress order on the register: an ordered list of frozen line
//! items plus a running total.
//!
//! ## Freezing Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A line item is FROZEN at append time:                                  │
//! │                                                                         │
//! │    selection ──► Quote (valid) ──► TicketLineItem                       │
//! │                                      ├── own uuid (ticket identity)     │
//! │                                      ├── final price (copied)           │
//! │                                      └── deep copy of the modifiers     │
//! │                                                                         │
//! │  Re-opening the customization screen afterwards starts a FRESH          │
//! │  session; it never edits a frozen line. The only mutation a line        │
//! │  supports is removal by its uuid.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The constructors for customized and variant lines take the engine's
//! [`Quote`] and refuse to freeze an invalid one, so an unpriceable line can
//! never reach the ticket.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::{FixedItem, MenuGroup, Variant, VariantItem};
use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;
use crate::pricing::Quote;
use crate::selection::SelectionSet;

// =============================================================================
// Line Item
// =============================================================================

/// How a line item was produced. Drives how the kitchen ticket renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum LineKind {
    /// Directly sellable item with a single catalog price.
    Fixed,
    /// Variant-priced item; `name` carries the chosen variant.
    Variant,
    /// Built through a customization session.
    Custom,
}

/// One frozen line of the ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TicketLineItem {
    /// Ticket-local identity, minted at append time. Distinct from any
    /// catalog id so the same item can appear on multiple lines.
    pub id: String,

    pub kind: LineKind,

    /// Display name, e.g. "Iced Tea (Large)" or "Build Your Own Crepe".
    pub name: String,

    /// Price frozen from the quote (or the catalog, for fixed items).
    pub price: Money,

    /// The rule label the quote carried ("2 base ingredient(s)"), shown as
    /// the line's sub-caption. Empty for fixed items.
    #[serde(default)]
    pub rule_label: String,

    /// Frozen modifier names, in stable id order. Kitchen tickets group
    /// these by their group tag.
    #[serde(default)]
    pub modifiers: Vec<FrozenModifier>,
}

/// A modifier as frozen onto a line: just what the kitchen needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FrozenModifier {
    pub name: String,
    pub group: String,
    pub price: Money,
}

impl TicketLineItem {
    /// Freezes a fixed-price item. Always valid; there is nothing to select.
    pub fn fixed(item: &FixedItem) -> Self {
        TicketLineItem {
            id: Uuid::new_v4().to_string(),
            kind: LineKind::Fixed,
            name: item.name.clone(),
            price: item.price,
            rule_label: String::new(),
            modifiers: Vec::new(),
        }
    }

    /// Freezes a variant-priced item with its chosen variant and modifiers.
    ///
    /// Rejects an invalid quote with the quote's own reason so the caller
    /// surfaces the same message the customization screen showed.
    pub fn variant(
        item: &VariantItem,
        variant: &Variant,
        selection: &SelectionSet,
        quote: &Quote,
    ) -> ValidationResult<Self> {
        if !quote.valid {
            return Err(ValidationError::InvalidSelection {
                reason: quote.reason.clone(),
            });
        }
        Ok(TicketLineItem {
            id: Uuid::new_v4().to_string(),
            kind: LineKind::Variant,
            name: format!("{} ({})", item.name, variant.name),
            price: quote.price,
            rule_label: variant.name.clone(),
            modifiers: freeze(selection),
        })
    }

    /// Freezes a customized item built in `group`'s customization session.
    pub fn custom(
        group: &MenuGroup,
        selection: &SelectionSet,
        quote: &Quote,
    ) -> ValidationResult<Self> {
        if !quote.valid {
            return Err(ValidationError::InvalidSelection {
                reason: quote.reason.clone(),
            });
        }
        Ok(TicketLineItem {
            id: Uuid::new_v4().to_string(),
            kind: LineKind::Custom,
            name: group.name.clone(),
            price: quote.price,
            rule_label: quote.reason.clone(),
            modifiers: freeze(selection),
        })
    }
}

/// Deep-copies the selection into kitchen-facing modifier records,
/// in the selection's stable id order.
fn freeze(selection: &SelectionSet) -> Vec<FrozenModifier> {
    selection
        .iter()
        .map(|m| FrozenModifier {
            name: m.name.clone(),
            group: m.group.clone(),
            price: m.price,
        })
        .collect()
}

// =============================================================================
// Ticket
// =============================================================================

/// The register's in-progress order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Ticket {
    lines: Vec<TicketLineItem>,
}

impl Ticket {
    /// Creates an empty ticket.
    pub fn new() -> Self {
        Ticket { lines: Vec::new() }
    }

    /// Appends a frozen line, preserving append order.
    pub fn push(&mut self, line: TicketLineItem) {
        self.lines.push(line);
    }

    /// Removes one line by its ticket-local id.
    pub fn remove(&mut self, line_id: &str) -> ValidationResult<TicketLineItem> {
        let index = self
            .lines
            .iter()
            .position(|l| l.id == line_id)
            .ok_or_else(|| ValidationError::LineNotFound {
                line_id: line_id.to_string(),
            })?;
        Ok(self.lines.remove(index))
    }

    /// Sum of every line's frozen price. Recomputed on demand, never cached.
    pub fn total(&self) -> Money {
        self.lines.iter().map(|l| l.price).sum()
    }

    /// The lines in append order.
    pub fn lines(&self) -> &[TicketLineItem] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drops every line. Used after a successful submission.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Modifier;

    fn fixed_item(name: &str, cents: i64) -> FixedItem {
        FixedItem {
            id: name.to_lowercase(),
            name: name.to_string(),
            category: "desserts".to_string(),
            price: Money::from_cents(cents),
            modifier_groups: vec![],
        }
    }

    fn modifier(id: &str, group: &str, cents: i64) -> Modifier {
        Modifier {
            id: id.to_string(),
            name: id.to_string(),
            price: Money::from_cents(cents),
            group: group.to_string(),
            exempt_from_dependent: false,
        }
    }

    fn valid_quote(cents: i64, reason: &str) -> Quote {
        Quote {
            price: Money::from_cents(cents),
            valid: true,
            reason: reason.to_string(),
        }
    }

    fn custom_group(name: &str) -> MenuGroup {
        MenuGroup {
            id: name.to_lowercase(),
            name: name.to_string(),
            price: None,
            parent: None,
            price_rule: None,
            composition: None,
            base_group: None,
            extra_groups: vec![],
            topping_groups: vec![],
        }
    }

    #[test]
    fn test_fixed_line_freezes_catalog_price() {
        let line = TicketLineItem::fixed(&fixed_item("Brownie", 2500));
        assert_eq!(line.kind, LineKind::Fixed);
        assert_eq!(line.price, Money::from_cents(2500));
        assert!(line.modifiers.is_empty());
    }

    #[test]
    fn test_custom_line_requires_valid_quote() {
        let group = custom_group("Double Blend");
        let invalid = Quote {
            price: Money::from_cents(4500),
            valid: false,
            reason: "must select 2 ingredient(s)".to_string(),
        };

        let err = TicketLineItem::custom(&group, &SelectionSet::new(), &invalid).unwrap_err();
        assert_eq!(
            err.to_string(),
            "selection is not valid: must select 2 ingredient(s)"
        );
    }

    #[test]
    fn test_custom_line_deep_copies_selection() {
        let group = custom_group("Build Your Own Crepe");
        let nutella = modifier("nutella", "sweet_crepe_base", 0);
        let selection = SelectionSet::new().toggle(&nutella, false);

        let line = TicketLineItem::custom(
            &group,
            &selection,
            &valid_quote(4000, "1 base ingredient(s)"),
        )
        .unwrap();

        // The line owns its copy; mutating the session afterwards must not
        // touch the frozen line.
        let _ = selection.toggle(&nutella, false);
        assert_eq!(line.modifiers.len(), 1);
        assert_eq!(line.modifiers[0].name, "nutella");
        assert_eq!(line.rule_label, "1 base ingredient(s)");
    }

    #[test]
    fn test_variant_line_name_includes_variant() {
        let item = VariantItem {
            id: "iced_tea".to_string(),
            name: "Iced Tea".to_string(),
            category: "drinks".to_string(),
            variants: vec![Variant {
                name: "Large".to_string(),
                price: Money::from_cents(3500),
            }],
            modifier_groups: vec![],
        };

        let line = TicketLineItem::variant(
            &item,
            &item.variants[0],
            &SelectionSet::new(),
            &valid_quote(3500, "Large"),
        )
        .unwrap();
        assert_eq!(line.name, "Iced Tea (Large)");
        assert_eq!(line.kind, LineKind::Variant);
    }

    #[test]
    fn test_same_item_twice_gets_distinct_line_ids() {
        let brownie = fixed_item("Brownie", 2500);
        let a = TicketLineItem::fixed(&brownie);
        let b = TicketLineItem::fixed(&brownie);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_total_tracks_append_and_remove() {
        let mut ticket = Ticket::new();
        let keep = TicketLineItem::fixed(&fixed_item("Brownie", 2500));
        let drop = TicketLineItem::fixed(&fixed_item("Flan", 3000));
        let drop_id = drop.id.clone();

        ticket.push(keep);
        ticket.push(drop);
        assert_eq!(ticket.total(), Money::from_cents(5500));

        let removed = ticket.remove(&drop_id).unwrap();
        assert_eq!(removed.name, "Flan");
        assert_eq!(ticket.total(), Money::from_cents(2500));
        assert_eq!(ticket.len(), 1);
    }

    #[test]
    fn test_remove_unknown_line_errors() {
        let mut ticket = Ticket::new();
        let err = ticket.remove("no-such-line").unwrap_err();
        assert!(matches!(err, ValidationError::LineNotFound { .. }));
    }

    #[test]
    fn test_clear_empties_ticket() {
        let mut ticket = Ticket::new();
        ticket.push(TicketLineItem::fixed(&fixed_item("Brownie", 2500)));
        ticket.clear();
        assert!(ticket.is_empty());
        assert_eq!(ticket.total(), Money::zero());
    }
}
