//! # Selection Engine
//!
//! Tracks the working set of chosen modifiers for one in-progress
//! customization and toggles it under exclusivity rules.
//!
//! ## Toggle Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  toggle(modifier, exclusive)                                            │
//! │                                                                         │
//! │  exclusive = true   1. remove every member of modifier's group          │
//! │                     2. toggle modifier itself                           │
//! │                                                                         │
//! │  exclusive = false  toggle modifier itself                              │
//! │                                                                         │
//! │  "toggle" = remove if present, insert otherwise                         │
//! │                                                                         │
//! │  Consequence: after an exclusive toggle the selection holds AT MOST     │
//! │  ONE member of that group, and toggling the same modifier twice with    │
//! │  no intervening conflict is the identity.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The set is persistent in the functional sense: `toggle` returns a new
//! `SelectionSet` and never mutates its input. A customization session owns
//! one set; cancelling the session simply drops it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Modifier;

// =============================================================================
// Selection Set
// =============================================================================

/// The set of modifiers currently chosen in a customization session.
///
/// Backed by a `BTreeMap` keyed on modifier id so iteration order is stable,
/// which keeps ticket lines and kitchen displays deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionSet {
    selected: BTreeMap<String, Modifier>,
}

impl SelectionSet {
    /// Creates an empty selection, one per customization session.
    pub fn new() -> Self {
        SelectionSet {
            selected: BTreeMap::new(),
        }
    }

    /// Toggles `modifier`, returning the resulting selection.
    ///
    /// When `exclusive` is true, every already-selected member of the
    /// modifier's group is removed first, so the group ends with at most one
    /// member. The receiver is left untouched.
    #[must_use]
    pub fn toggle(&self, modifier: &Modifier, exclusive: bool) -> SelectionSet {
        let mut next = self.selected.clone();

        if exclusive {
            next.retain(|_, m| m.group != modifier.group);
            // If the modifier itself was among the removed siblings, this was
            // a deselect: removing it already toggled it off.
            if self.selected.contains_key(&modifier.id) {
                return SelectionSet { selected: next };
            }
        }

        if next.remove(&modifier.id).is_none() {
            next.insert(modifier.id.clone(), modifier.clone());
        }

        SelectionSet { selected: next }
    }

    /// Whether a modifier id is currently selected.
    pub fn contains(&self, modifier_id: &str) -> bool {
        self.selected.contains_key(modifier_id)
    }

    /// Number of selected modifiers belonging to `group_tag`.
    pub fn count_in_group(&self, group_tag: &str) -> u32 {
        self.selected
            .values()
            .filter(|m| m.group == group_tag)
            .count() as u32
    }

    /// The single selected member of `group_tag`, if exactly one is selected.
    pub fn sole_in_group(&self, group_tag: &str) -> Option<&Modifier> {
        let mut in_group = self.selected.values().filter(|m| m.group == group_tag);
        match (in_group.next(), in_group.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    /// Iterates the selected modifiers in stable id order.
    pub fn iter(&self) -> impl Iterator<Item = &Modifier> {
        self.selected.values()
    }

    /// Deep-copies the selection into an owned list, in stable id order.
    /// Used when freezing a ticket line.
    pub fn to_vec(&self) -> Vec<Modifier> {
        self.selected.values().cloned().collect()
    }

    /// Total number of selected modifiers.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
