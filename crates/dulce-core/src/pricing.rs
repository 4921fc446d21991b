//! # Pricing/Validation Engine
//!
//! Pure function mapping (descriptor, price rule, current selection) to
//! (price, validity, human-readable rule label). The POS front end renders
//! this output verbatim; it never recomputes a price.
//!
//! ## Evaluation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    evaluate(descriptor, rule, selection)                │
//! │                                                                         │
//! │  1. Count base-group selections, sum positive-priced surcharges         │
//! │                                                                         │
//! │  2. Composition dispatch                                                │
//! │     ├── ExclusiveChoice  exactly 1 base  → group's fixed price          │
//! │     ├── ExactCount(N)    exactly N bases → tier with count == N         │
//! │     └── ThresholdCount   >= 1 base       → highest tier count <= bases  │
//! │                                                                         │
//! │  3. Conditional dependency (milk): unless the chosen base is exempt,    │
//! │     exactly one dependent-group selection is required                   │
//! │                                                                         │
//! │  4. Quote { price, valid, reason }                                      │
//! │                                                                         │
//! │  The surcharge total is ALWAYS included in the reported price, valid    │
//! │  or not, so the operator watches the running total build up while the   │
//! │  selection is still incomplete.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This function never panics and never returns a negative price. Callers
//! gate "add to ticket" strictly on [`Quote::valid`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::{Composition, MenuGroup, Modifier, PriceRule, Variant, VariantItem};
use crate::money::Money;
use crate::selection::SelectionSet;

// =============================================================================
// Quote
// =============================================================================

/// The pricing engine's complete answer for one selection state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quote {
    /// Accumulated price: derivable base price + all positive surcharges.
    /// Always >= 0, reported even while the selection is invalid.
    pub price: Money,

    /// Whether the selection satisfies the composition rules. Only a valid
    /// quote may be added to the ticket.
    pub valid: bool,

    /// When valid: the human-readable rule label ("2 base ingredient(s)").
    /// When invalid: what is missing ("must select 2 ingredient(s)").
    pub reason: String,
}

impl Quote {
    fn valid(price: Money, reason: impl Into<String>) -> Self {
        Quote {
            price,
            valid: true,
            reason: reason.into(),
        }
    }

    fn invalid(price: Money, reason: impl Into<String>) -> Self {
        Quote {
            price,
            valid: false,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Pricing Descriptor
// =============================================================================

/// Everything the engine needs to know about the item being customized,
/// extracted from its menu group at session-open time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingDescriptor {
    /// Display name, used for ticket line labels.
    pub name: String,
    /// The composition kind this customization follows.
    pub composition: Composition,
    /// Fixed base price (exclusive-choice compositions only).
    pub fixed_price: Money,
    /// Modifier group whose selections drive the base price.
    pub base_group: String,
    /// Dependent modifier group that must carry exactly one selection unless
    /// the chosen base modifier is exempt.
    pub dependent_group: Option<String>,
}

impl PricingDescriptor {
    /// Builds the descriptor for a customizable group.
    ///
    /// Returns `None` for purely navigational groups. Catalog ingestion has
    /// already guaranteed that a customizable group carries a base group and
    /// the data its composition kind needs.
    pub fn from_group(group: &MenuGroup) -> Option<Self> {
        let composition = group.composition?;
        Some(PricingDescriptor {
            name: group.name.clone(),
            composition,
            fixed_price: group.price.unwrap_or_else(Money::zero),
            base_group: group.base_group.clone().unwrap_or_default(),
            dependent_group: group.dependent_group().map(str::to_string),
        })
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Prices and validates one customization state.
///
/// Pure and total: any (descriptor, rule, selection) combination yields a
/// quote with `price >= 0`; invalid states still report the accumulated
/// surcharge total so the running price stays visible.
pub fn evaluate(
    descriptor: &PricingDescriptor,
    rule: Option<&PriceRule>,
    selection: &SelectionSet,
) -> Quote {
    let base_count = selection.count_in_group(&descriptor.base_group);
    let extra_cost = surcharge_total(selection);

    // Composition dispatch: derive the base price and the base validity.
    let (base_price, base_quote) = match descriptor.composition {
        Composition::ExclusiveChoice => {
            if base_count == 1 {
                (descriptor.fixed_price, Ok("base price".to_string()))
            } else {
                (
                    Money::zero(),
                    Err("must select exactly one base option".to_string()),
                )
            }
        }
        Composition::ExactCount { required } => {
            let price = rule
                .and_then(|r| r.exact_tier(required))
                .unwrap_or_else(Money::zero);
            if base_count == required {
                (price, Ok(format!("{required} base ingredient(s)")))
            } else {
                (
                    Money::zero(),
                    Err(format!("must select {required} ingredient(s)")),
                )
            }
        }
        Composition::ThresholdCount => {
            let price = rule
                .and_then(|r| r.threshold_tier(base_count))
                .unwrap_or_else(Money::zero);
            if base_count >= 1 {
                (price, Ok(format!("{base_count} base ingredient(s)")))
            } else {
                (
                    Money::zero(),
                    Err("must select at least 1 base ingredient".to_string()),
                )
            }
        }
    };

    let price = base_price + extra_cost;

    let label = match base_quote {
        Ok(label) => label,
        Err(reason) => return Quote::invalid(price, reason),
    };

    // Conditional dependency: the dependent group needs exactly one selection
    // unless every chosen base modifier is flagged exempt.
    if let Some(dependent) = &descriptor.dependent_group {
        let requires_dependent = selection
            .iter()
            .any(|m| m.group == descriptor.base_group && !m.exempt_from_dependent);
        if requires_dependent && selection.count_in_group(dependent) != 1 {
            return Quote::invalid(price, "must select a required dependent option");
        }
    }

    Quote::valid(price, label)
}

/// Prices a variant-priced item state: variant price plus every selected
/// modifier surcharge; valid once each required-exclusive group declared by
/// the item holds exactly one selection.
pub fn evaluate_variant(item: &VariantItem, variant: &Variant, selection: &SelectionSet) -> Quote {
    let price = variant.price + surcharge_total(selection);

    for group in item.required_exclusive_groups() {
        if selection.count_in_group(group) != 1 {
            return Quote::invalid(price, format!("must select exactly one option from '{group}'"));
        }
    }

    Quote::valid(price, variant.name.clone())
}

/// Sum of every selected modifier with a positive price, regardless of group.
fn surcharge_total(selection: &SelectionSet) -> Money {
    selection
        .iter()
        .filter(|m| m.price.is_positive())
        .map(|m| m.price)
        .sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PriceTier;

    const CREPE_BASE: &str = "sweet_crepe_base";
    const BLEND_BASE: &str = "blend_ingredients";
    const FRAPPE_BASE: &str = "frappe_flavors";
    const MILK: &str = "milk_options";
    const TOPPINGS: &str = "crepe_toppings";

    fn modifier(id: &str, group: &str, cents: i64) -> Modifier {
        Modifier {
            id: id.to_string(),
            name: id.to_string(),
            price: Money::from_cents(cents),
            group: group.to_string(),
            exempt_from_dependent: false,
        }
    }

    fn exempt_modifier(id: &str, group: &str) -> Modifier {
        Modifier {
            exempt_from_dependent: true,
            ..modifier(id, group, 0)
        }
    }

    fn rule(tiers: &[(u32, i64)]) -> PriceRule {
        PriceRule {
            id: "rule".to_string(),
            name: "rule".to_string(),
            tiers: tiers
                .iter()
                .map(|&(count, cents)| PriceTier {
                    count,
                    price: Money::from_cents(cents),
                })
                .collect(),
        }
    }

    fn threshold_descriptor() -> PricingDescriptor {
        PricingDescriptor {
            name: "Build Your Own Crepe".to_string(),
            composition: Composition::ThresholdCount,
            fixed_price: Money::zero(),
            base_group: CREPE_BASE.to_string(),
            dependent_group: None,
        }
    }

    fn exact_descriptor(required: u32) -> PricingDescriptor {
        PricingDescriptor {
            name: "Double Blend".to_string(),
            composition: Composition::ExactCount { required },
            fixed_price: Money::zero(),
            base_group: BLEND_BASE.to_string(),
            dependent_group: Some(MILK.to_string()),
        }
    }

    fn exclusive_descriptor(cents: i64) -> PricingDescriptor {
        PricingDescriptor {
            name: "Frappe".to_string(),
            composition: Composition::ExclusiveChoice,
            fixed_price: Money::from_cents(cents),
            base_group: FRAPPE_BASE.to_string(),
            dependent_group: Some(MILK.to_string()),
        }
    }

    fn select(mods: &[&Modifier]) -> SelectionSet {
        mods.iter()
            .fold(SelectionSet::new(), |s, m| s.toggle(m, false))
    }

    // Scenario from the menu card: tiers {1: $40, 2: $55, 3: $65},
    // 2 base ingredients + 1 topping at $8 → $63, valid.
    #[test]
    fn test_threshold_two_bases_one_topping() {
        let tiers = rule(&[(1, 4000), (2, 5500), (3, 6500)]);
        let nutella = modifier("nutella", CREPE_BASE, 0);
        let banana = modifier("banana", CREPE_BASE, 0);
        let ice_cream = modifier("ice_cream", TOPPINGS, 800);

        let quote = evaluate(
            &threshold_descriptor(),
            Some(&tiers),
            &select(&[&nutella, &banana, &ice_cream]),
        );

        assert!(quote.valid);
        assert_eq!(quote.price, Money::from_cents(6300));
        assert_eq!(quote.reason, "2 base ingredient(s)");
    }

    #[test]
    fn test_threshold_zero_bases_invalid_but_shows_surcharges() {
        let tiers = rule(&[(1, 4000), (2, 5500)]);
        let ice_cream = modifier("ice_cream", TOPPINGS, 800);

        let quote = evaluate(&threshold_descriptor(), Some(&tiers), &select(&[&ice_cream]));

        assert!(!quote.valid);
        assert_eq!(quote.reason, "must select at least 1 base ingredient");
        // Running total stays visible pre-validation.
        assert_eq!(quote.price, Money::from_cents(800));
    }

    #[test]
    fn test_threshold_base_price_never_decreases_with_count() {
        let tiers = rule(&[(1, 4000), (2, 5500), (3, 6500)]);
        let descriptor = threshold_descriptor();

        let mut selection = SelectionSet::new();
        let mut last = Money::zero();
        for i in 0..6 {
            selection = selection.toggle(&modifier(&format!("ing{i}"), CREPE_BASE, 0), false);
            let quote = evaluate(&descriptor, Some(&tiers), &selection);
            assert!(quote.valid);
            assert!(quote.price >= last, "tier price regressed at count {}", i + 1);
            last = quote.price;
        }
    }

    // Scenario: rule requires 2 ingredients; 1 selected → invalid with the
    // exact operator-facing message.
    #[test]
    fn test_exact_count_under_selected() {
        let tiers = rule(&[(1, 4500), (2, 5500)]);
        let mango = modifier("mango", BLEND_BASE, 0);
        let milk = modifier("whole_milk", MILK, 0);

        let quote = evaluate(&exact_descriptor(2), Some(&tiers), &select(&[&mango, &milk]));

        assert!(!quote.valid);
        assert_eq!(quote.reason, "must select 2 ingredient(s)");
    }

    #[test]
    fn test_exact_count_satisfied_with_milk() {
        let tiers = rule(&[(1, 4500), (2, 5500)]);
        let mango = modifier("mango", BLEND_BASE, 0);
        let berry = modifier("berry", BLEND_BASE, 0);
        let milk = modifier("whole_milk", MILK, 0);

        let quote = evaluate(
            &exact_descriptor(2),
            Some(&tiers),
            &select(&[&mango, &berry, &milk]),
        );

        assert!(quote.valid);
        assert_eq!(quote.price, Money::from_cents(5500));
        assert_eq!(quote.reason, "2 base ingredient(s)");
    }

    #[test]
    fn test_exclusive_choice_requires_exactly_one() {
        let descriptor = exclusive_descriptor(5000);
        let mocha = modifier("mocha", FRAPPE_BASE, 0);
        let taro = modifier("taro", FRAPPE_BASE, 0);
        let milk = modifier("whole_milk", MILK, 0);

        let none = evaluate(&descriptor, None, &select(&[&milk]));
        assert!(!none.valid);
        assert_eq!(none.reason, "must select exactly one base option");

        let two = evaluate(&descriptor, None, &select(&[&mocha, &taro, &milk]));
        assert!(!two.valid);

        let one = evaluate(&descriptor, None, &select(&[&mocha, &milk]));
        assert!(one.valid);
        assert_eq!(one.price, Money::from_cents(5000));
        assert_eq!(one.reason, "base price");
    }

    #[test]
    fn test_milk_dependency_blocks_until_selected() {
        let descriptor = exclusive_descriptor(5000);
        let mocha = modifier("mocha", FRAPPE_BASE, 0);
        let pearls = modifier("pearls", "frappe_extras", 500);

        let quote = evaluate(&descriptor, None, &select(&[&mocha, &pearls]));

        assert!(!quote.valid);
        assert_eq!(quote.reason, "must select a required dependent option");
        // Accumulated price still reported: base $50 + $5 pearls.
        assert_eq!(quote.price, Money::from_cents(5500));
    }

    #[test]
    fn test_exempt_base_waives_milk_dependency() {
        let descriptor = exclusive_descriptor(5000);
        let lime = exempt_modifier("lime_soda", FRAPPE_BASE);

        let quote = evaluate(&descriptor, None, &select(&[&lime]));

        assert!(quote.valid);
        assert_eq!(quote.price, Money::from_cents(5000));
    }

    #[test]
    fn test_evaluate_is_total_and_non_negative() {
        // Sweep every composition against a grab-bag of selections, with and
        // without a rule; the engine must always answer with price >= 0.
        let descriptors = [
            threshold_descriptor(),
            exact_descriptor(2),
            exclusive_descriptor(5000),
        ];
        let tiers = rule(&[(1, 4000), (2, 5500)]);
        let mods = [
            modifier("a", CREPE_BASE, 0),
            modifier("b", BLEND_BASE, 0),
            modifier("c", FRAPPE_BASE, 0),
            modifier("d", MILK, 300),
            modifier("e", TOPPINGS, 800),
        ];

        for descriptor in &descriptors {
            for take in 0..=mods.len() {
                let selection = select(&mods[..take].iter().collect::<Vec<_>>());
                for rule_opt in [None, Some(&tiers)] {
                    let quote = evaluate(descriptor, rule_opt, &selection);
                    assert!(quote.price >= Money::zero());
                    assert!(!quote.reason.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_variant_pricing_with_required_flavor() {
        let item = VariantItem {
            id: "iced_tea".to_string(),
            name: "Iced Tea".to_string(),
            category: "drinks".to_string(),
            variants: vec![Variant {
                name: "Large".to_string(),
                price: Money::from_cents(3500),
            }],
            modifier_groups: vec!["tea_flavor".to_string(), "cold_drink_toppings".to_string()],
        };
        let variant = &item.variants[0];

        // Required flavor group unselected → not addable.
        let missing = evaluate_variant(&item, variant, &SelectionSet::new());
        assert!(!missing.valid);
        assert_eq!(
            missing.reason,
            "must select exactly one option from 'tea_flavor'"
        );
        assert_eq!(missing.price, Money::from_cents(3500));

        let jasmine = modifier("jasmine", "tea_flavor", 0);
        let pearls = modifier("pearls", "cold_drink_toppings", 500);
        let quote = evaluate_variant(&item, variant, &select(&[&jasmine, &pearls]));

        assert!(quote.valid);
        assert_eq!(quote.price, Money::from_cents(4000));
        assert_eq!(quote.reason, "Large");
    }
}
