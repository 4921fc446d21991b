//! # Catalog Snapshot
//!
//! Immutable, by-id lookup tables for the four menu collections, loaded once
//! per session.
//!
//! ## Collection Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Catalog Collections                                │
//! │                                                                         │
//! │  ┌───────────────┐  ┌───────────────┐  ┌───────────────┐               │
//! │  │   MenuGroup   │  │   MenuItem    │  │   Modifier    │               │
//! │  │ ───────────── │  │ ───────────── │  │ ───────────── │               │
//! │  │ id            │  │ Fixed{price}  │  │ id            │               │
//! │  │ price?        │  │ Variants[..]  │  │ price (>= 0)  │               │
//! │  │ price_rule? ──┼──┐│ modifier_    │  │ group tag     │               │
//! │  │ base_group    │  ││   groups[..] │  │ exempt flag   │               │
//! │  │ composition   │  │└───────────────┘  └───────────────┘               │
//! │  └───────────────┘  │                                                   │
//! │                     │  ┌───────────────┐                                │
//! │                     └─►│   PriceRule   │  tiers: (count → price),       │
//! │                        │ ───────────── │  counts unique, sorted asc     │
//! │                        └───────────────┘                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ingestion Decides Shape, Once
//! Raw item records arrive with *optional* `price` and *optional* `variants`
//! fields. [`CatalogSnapshot::ingest`] converts each into the explicit
//! [`MenuItem`] enum and rejects ambiguous records. Nothing downstream ever
//! probes fields to guess what an item is.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CatalogError;
use crate::money::Money;

// =============================================================================
// Modifier Group Tags
// =============================================================================

/// Group tag for milk-type modifiers (the conditional dependent group).
pub const MILK_GROUP: &str = "milk_options";

/// Group tag for tea-flavor modifiers on variant-priced drinks.
pub const TEA_FLAVOR_GROUP: &str = "tea_flavor";

/// Modifier groups that demand exactly one selection before a variant-priced
/// item becomes addable. A closed set: the menu's composition rules are fixed
/// at build time, not operator-extensible.
pub const REQUIRED_EXCLUSIVE_GROUPS: &[&str] = &[MILK_GROUP, TEA_FLAVOR_GROUP];

// =============================================================================
// Modifier
// =============================================================================

/// A selectable modifier (ingredient, flavor, milk type, topping).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Modifier {
    /// Unique id within the catalog.
    pub id: String,

    /// Display name shown on buttons and kitchen tickets.
    pub name: String,

    /// Surcharge in cents. Zero for included ingredients; never negative.
    pub price: Money,

    /// Owning modifier-group tag (e.g. "sweet_crepe_base", "milk_options").
    pub group: String,

    /// When true, choosing this base modifier waives the dependent-group
    /// requirement (e.g. a flavor that is prepared without milk).
    #[serde(default)]
    pub exempt_from_dependent: bool,
}

// =============================================================================
// Price Rule
// =============================================================================

/// One (requiredCount → price) tier of a price rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceTier {
    /// Base-ingredient count this tier applies to.
    pub count: u32,
    /// Base price at this count.
    pub price: Money,
}

/// A tiered base-price rule referenced by customizable menu groups.
///
/// ## Invariants (enforced at ingestion)
/// - at least one tier
/// - tier counts unique within the rule
/// - tiers stored sorted ascending by count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceRule {
    pub id: String,
    pub name: String,
    pub tiers: Vec<PriceTier>,
}

impl PriceRule {
    /// Returns the tier price whose count equals `count` exactly.
    pub fn exact_tier(&self, count: u32) -> Option<Money> {
        self.tiers
            .iter()
            .find(|t| t.count == count)
            .map(|t| t.price)
    }

    /// Returns the price of the tier with the greatest count not exceeding
    /// `count` (tiers scanned in descending count order).
    pub fn threshold_tier(&self, count: u32) -> Option<Money> {
        self.tiers
            .iter()
            .rev()
            .find(|t| count >= t.count)
            .map(|t| t.price)
    }
}

// =============================================================================
// Composition
// =============================================================================

/// The pricing/validation rule family a customizable group follows.
///
/// Decided at catalog-ingestion time from the group record; the pricing
/// engine dispatches on this tag and never re-derives it from other fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum Composition {
    /// Exactly one base-group modifier drives a fixed group price
    /// (frappes, milkshakes, flavored sodas).
    ExclusiveChoice,
    /// Exactly `required` base-group modifiers, priced by the matching tier
    /// (single/double blends).
    ExactCount { required: u32 },
    /// At least one base-group modifier, priced by the highest tier not
    /// exceeding the selected count (build-your-own crepes, desserts).
    ThresholdCount,
}

// =============================================================================
// Menu Group
// =============================================================================

/// A node of the menu tree. Plain groups navigate; groups carrying a
/// `composition` open a customization session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MenuGroup {
    pub id: String,
    pub name: String,

    /// Fixed base price, required for `ExclusiveChoice` compositions.
    #[serde(default)]
    pub price: Option<Money>,

    /// Parent group id ("root" children form the top-level screen).
    #[serde(default)]
    pub parent: Option<String>,

    /// Price rule reference, required for counted compositions.
    /// Invariant: when present, must resolve to an existing rule.
    #[serde(default)]
    pub price_rule: Option<String>,

    /// How this group's customizations are priced and validated.
    /// `None` means the group is purely navigational.
    #[serde(default)]
    pub composition: Option<Composition>,

    /// Modifier group whose selected count/identity drives the base price.
    #[serde(default)]
    pub base_group: Option<String>,

    /// Additional cost-bearing modifier groups (includes the milk group when
    /// the composition has a conditional milk dependency).
    #[serde(default)]
    pub extra_groups: Vec<String>,

    /// Topping modifier groups (multi-select, surcharge only).
    #[serde(default)]
    pub topping_groups: Vec<String>,
}

impl MenuGroup {
    /// Whether tapping this group opens a customization session rather than
    /// navigating deeper.
    #[inline]
    pub fn is_customizable(&self) -> bool {
        self.composition.is_some()
    }

    /// The dependent modifier group this composition conditionally requires,
    /// if any. Currently only the milk group plays this role.
    pub fn dependent_group(&self) -> Option<&str> {
        self.extra_groups
            .iter()
            .map(String::as_str)
            .find(|g| *g == MILK_GROUP)
    }

    /// Every modifier-group tag applicable to this group's customizations.
    pub fn modifier_group_tags(&self) -> Vec<&str> {
        self.base_group
            .iter()
            .chain(self.extra_groups.iter())
            .chain(self.topping_groups.iter())
            .map(String::as_str)
            .collect()
    }
}

// =============================================================================
// Menu Item
// =============================================================================

/// One price point of a variant-priced item (e.g. a drink size).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Variant {
    pub name: String,
    pub price: Money,
}

/// A directly sellable item with a single fixed price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FixedItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: Money,
    #[serde(default)]
    pub modifier_groups: Vec<String>,
}

/// A sellable item priced by an ordered list of discrete variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VariantItem {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Ordered as authored; the first variant is the default selection.
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub modifier_groups: Vec<String>,
}

impl VariantItem {
    /// Modifier groups on this item that require exactly one selection.
    pub fn required_exclusive_groups(&self) -> Vec<&str> {
        self.modifier_groups
            .iter()
            .map(String::as_str)
            .filter(|g| REQUIRED_EXCLUSIVE_GROUPS.contains(g))
            .collect()
    }
}

/// A sellable menu item. The tag is decided once, at catalog ingestion;
/// downstream code matches on the variant and never probes fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "shape", rename_all = "snake_case")]
#[ts(export)]
pub enum MenuItem {
    Fixed(FixedItem),
    Variants(VariantItem),
}

impl MenuItem {
    /// The item's catalog id.
    pub fn id(&self) -> &str {
        match self {
            MenuItem::Fixed(item) => &item.id,
            MenuItem::Variants(item) => &item.id,
        }
    }

    /// The item's display name.
    pub fn name(&self) -> &str {
        match self {
            MenuItem::Fixed(item) => &item.name,
            MenuItem::Variants(item) => &item.name,
        }
    }
}

/// Raw wire shape of a `menu_items` record, before the shape tag is decided.
///
/// Exactly one of `price` / `variants` must be present.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMenuItem {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub variants: Option<Vec<Variant>>,
    #[serde(default)]
    pub modifier_groups: Vec<String>,
}

impl RawMenuItem {
    /// Resolves the raw record into the tagged [`MenuItem`].
    fn into_item(self) -> Result<MenuItem, CatalogError> {
        match (self.price, self.variants) {
            (Some(price), None) => Ok(MenuItem::Fixed(FixedItem {
                id: self.id,
                name: self.name,
                category: self.category,
                price,
                modifier_groups: self.modifier_groups,
            })),
            (None, Some(variants)) if !variants.is_empty() => {
                Ok(MenuItem::Variants(VariantItem {
                    id: self.id,
                    name: self.name,
                    category: self.category,
                    variants,
                    modifier_groups: self.modifier_groups,
                }))
            }
            (None, Some(_)) => Err(CatalogError::AmbiguousItemShape {
                item_id: self.id,
                reason: "variants list is empty".to_string(),
            }),
            (Some(_), Some(_)) => Err(CatalogError::AmbiguousItemShape {
                item_id: self.id,
                reason: "both price and variants are set".to_string(),
            }),
            (None, None) => Err(CatalogError::AmbiguousItemShape {
                item_id: self.id,
                reason: "neither price nor variants is set".to_string(),
            }),
        }
    }
}

// =============================================================================
// Catalog Snapshot
// =============================================================================

/// The validated, immutable catalog for one session.
///
/// Built once by [`CatalogSnapshot::ingest`]; the selection and pricing
/// engines receive read-only references, never shared mutable state.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    groups: HashMap<String, MenuGroup>,
    items: HashMap<String, MenuItem>,
    modifiers: HashMap<String, Modifier>,
    rules: HashMap<String, PriceRule>,
}

impl CatalogSnapshot {
    /// Validates the four raw collections and freezes them into a snapshot.
    ///
    /// ## Invariants enforced here
    /// - ids unique within each collection
    /// - every non-null `price_rule` reference resolves
    /// - price rules are non-empty with unique tier counts (tiers are sorted
    ///   ascending so the threshold scan can walk them in reverse)
    /// - modifier prices are non-negative
    /// - a composition's required data is present: fixed price for
    ///   `ExclusiveChoice`, a rule with the matching tier for `ExactCount`,
    ///   a rule for `ThresholdCount`, and a base group for all three
    pub fn ingest(
        groups: Vec<MenuGroup>,
        raw_items: Vec<RawMenuItem>,
        modifiers: Vec<Modifier>,
        mut rules: Vec<PriceRule>,
    ) -> Result<Self, CatalogError> {
        // Rules first: groups validate against them.
        let mut rule_map = HashMap::with_capacity(rules.len());
        for rule in rules.iter_mut() {
            if rule.tiers.is_empty() {
                return Err(CatalogError::EmptyPriceRule {
                    rule_id: rule.id.clone(),
                });
            }
            rule.tiers.sort_by_key(|t| t.count);
            for pair in rule.tiers.windows(2) {
                if pair[0].count == pair[1].count {
                    return Err(CatalogError::DuplicateTierCount {
                        rule_id: rule.id.clone(),
                        count: pair[0].count,
                    });
                }
            }
        }
        for rule in rules {
            if let Some(previous) = rule_map.insert(rule.id.clone(), rule) {
                return Err(CatalogError::DuplicateId {
                    collection: "price_rules",
                    id: previous.id,
                });
            }
        }

        let mut group_map = HashMap::with_capacity(groups.len());
        for group in groups {
            validate_group(&group, &rule_map)?;
            if let Some(previous) = group_map.insert(group.id.clone(), group) {
                return Err(CatalogError::DuplicateId {
                    collection: "menu_groups",
                    id: previous.id,
                });
            }
        }

        let mut item_map = HashMap::with_capacity(raw_items.len());
        for raw in raw_items {
            let item = raw.into_item()?;
            if let Some(previous) = item_map.insert(item.id().to_string(), item) {
                return Err(CatalogError::DuplicateId {
                    collection: "menu_items",
                    id: previous.id().to_string(),
                });
            }
        }

        let mut modifier_map = HashMap::with_capacity(modifiers.len());
        for modifier in modifiers {
            if modifier.price.is_negative() {
                return Err(CatalogError::NegativeModifierPrice {
                    modifier_id: modifier.id,
                });
            }
            if let Some(previous) = modifier_map.insert(modifier.id.clone(), modifier) {
                return Err(CatalogError::DuplicateId {
                    collection: "modifiers",
                    id: previous.id,
                });
            }
        }

        Ok(CatalogSnapshot {
            groups: group_map,
            items: item_map,
            modifiers: modifier_map,
            rules: rule_map,
        })
    }

    /// Looks up a menu group by id.
    pub fn group(&self, id: &str) -> Option<&MenuGroup> {
        self.groups.get(id)
    }

    /// Looks up a menu item by id.
    pub fn item(&self, id: &str) -> Option<&MenuItem> {
        self.items.get(id)
    }

    /// Looks up a modifier by id.
    pub fn modifier(&self, id: &str) -> Option<&Modifier> {
        self.modifiers.get(id)
    }

    /// Looks up a price rule by id.
    pub fn rule(&self, id: &str) -> Option<&PriceRule> {
        self.rules.get(id)
    }

    /// The price rule a customizable group references, if any.
    pub fn rule_for(&self, group: &MenuGroup) -> Option<&PriceRule> {
        group.price_rule.as_deref().and_then(|id| self.rules.get(id))
    }

    /// All modifiers in one group tag, sorted by id for stable display order.
    pub fn modifiers_in_group(&self, group_tag: &str) -> Vec<&Modifier> {
        let mut mods: Vec<&Modifier> = self
            .modifiers
            .values()
            .filter(|m| m.group == group_tag)
            .collect();
        mods.sort_by(|a, b| a.id.cmp(&b.id));
        mods
    }

    /// Child groups of a parent, for menu navigation.
    pub fn children_of(&self, parent_id: &str) -> Vec<&MenuGroup> {
        let mut children: Vec<&MenuGroup> = self
            .groups
            .values()
            .filter(|g| g.parent.as_deref() == Some(parent_id))
            .collect();
        children.sort_by(|a, b| a.id.cmp(&b.id));
        children
    }

    /// Collection sizes, for session-load logging.
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        (
            self.groups.len(),
            self.items.len(),
            self.modifiers.len(),
            self.rules.len(),
        )
    }
}

/// Checks one group's references and composition requirements.
fn validate_group(
    group: &MenuGroup,
    rules: &HashMap<String, PriceRule>,
) -> Result<(), CatalogError> {
    if let Some(rule_id) = &group.price_rule {
        if !rules.contains_key(rule_id) {
            return Err(CatalogError::DanglingPriceRule {
                group_id: group.id.clone(),
                rule_id: rule_id.clone(),
            });
        }
    }

    let Some(composition) = group.composition else {
        return Ok(());
    };

    if group.base_group.is_none() {
        return Err(CatalogError::MisconfiguredGroup {
            group_id: group.id.clone(),
            reason: "customizable group has no base modifier group".to_string(),
        });
    }

    match composition {
        Composition::ExclusiveChoice => {
            if group.price.is_none() {
                return Err(CatalogError::MisconfiguredGroup {
                    group_id: group.id.clone(),
                    reason: "exclusive-choice composition requires a fixed price".to_string(),
                });
            }
        }
        Composition::ExactCount { required } => {
            let rule = group
                .price_rule
                .as_deref()
                .and_then(|id| rules.get(id))
                .ok_or_else(|| CatalogError::MisconfiguredGroup {
                    group_id: group.id.clone(),
                    reason: "exact-count composition requires a price rule".to_string(),
                })?;
            if rule.exact_tier(required).is_none() {
                return Err(CatalogError::MisconfiguredGroup {
                    group_id: group.id.clone(),
                    reason: format!("price rule has no tier for count {required}"),
                });
            }
        }
        Composition::ThresholdCount => {
            if group
                .price_rule
                .as_deref()
                .map_or(true, |id| !rules.contains_key(id))
            {
                return Err(CatalogError::MisconfiguredGroup {
                    group_id: group.id.clone(),
                    reason: "threshold-count composition requires a price rule".to_string(),
                });
            }
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, tiers: &[(u32, i64)]) -> PriceRule {
        PriceRule {
            id: id.to_string(),
            name: id.to_string(),
            tiers: tiers
                .iter()
                .map(|&(count, cents)| PriceTier {
                    count,
                    price: Money::from_cents(cents),
                })
                .collect(),
        }
    }

    fn plain_group(id: &str) -> MenuGroup {
        MenuGroup {
            id: id.to_string(),
            name: id.to_string(),
            price: None,
            parent: None,
            price_rule: None,
            composition: None,
            base_group: None,
            extra_groups: vec![],
            topping_groups: vec![],
        }
    }

    fn raw_fixed(id: &str, cents: i64) -> RawMenuItem {
        RawMenuItem {
            id: id.to_string(),
            name: id.to_string(),
            category: "test".to_string(),
            price: Some(Money::from_cents(cents)),
            variants: None,
            modifier_groups: vec![],
        }
    }

    #[test]
    fn test_ingest_resolves_item_shapes() {
        let raw_variant = RawMenuItem {
            id: "cappuccino".to_string(),
            name: "Cappuccino".to_string(),
            category: "drinks".to_string(),
            price: None,
            variants: Some(vec![Variant {
                name: "Large".to_string(),
                price: Money::from_cents(3500),
            }]),
            modifier_groups: vec![MILK_GROUP.to_string()],
        };

        let catalog = CatalogSnapshot::ingest(
            vec![plain_group("root")],
            vec![raw_fixed("brownie", 2500), raw_variant],
            vec![],
            vec![],
        )
        .unwrap();

        assert!(matches!(catalog.item("brownie"), Some(MenuItem::Fixed(_))));
        assert!(matches!(
            catalog.item("cappuccino"),
            Some(MenuItem::Variants(_))
        ));
    }

    #[test]
    fn test_ingest_rejects_ambiguous_item() {
        let mut raw = raw_fixed("weird", 1000);
        raw.variants = Some(vec![Variant {
            name: "Only".to_string(),
            price: Money::from_cents(1000),
        }]);

        let err = CatalogSnapshot::ingest(vec![], vec![raw], vec![], vec![]).unwrap_err();
        assert!(matches!(err, CatalogError::AmbiguousItemShape { .. }));
    }

    #[test]
    fn test_ingest_rejects_dangling_rule_reference() {
        let mut group = plain_group("crepes");
        group.price_rule = Some("missing_rule".to_string());

        let err = CatalogSnapshot::ingest(vec![group], vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, CatalogError::DanglingPriceRule { .. }));
    }

    #[test]
    fn test_ingest_rejects_duplicate_tier_counts() {
        let bad_rule = rule("r", &[(1, 4000), (1, 5000)]);
        let err = CatalogSnapshot::ingest(vec![], vec![], vec![], vec![bad_rule]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateTierCount { .. }));
    }

    #[test]
    fn test_ingest_rejects_negative_modifier_price() {
        let bad = Modifier {
            id: "m".to_string(),
            name: "M".to_string(),
            price: Money::from_cents(-100),
            group: "g".to_string(),
            exempt_from_dependent: false,
        };
        let err = CatalogSnapshot::ingest(vec![], vec![], vec![bad], vec![]).unwrap_err();
        assert!(matches!(err, CatalogError::NegativeModifierPrice { .. }));
    }

    #[test]
    fn test_ingest_validates_exact_count_tier_exists() {
        let mut group = plain_group("blends");
        group.base_group = Some("blend_ingredients".to_string());
        group.price_rule = Some("blend_rule".to_string());
        group.composition = Some(Composition::ExactCount { required: 3 });

        let err = CatalogSnapshot::ingest(
            vec![group],
            vec![],
            vec![],
            vec![rule("blend_rule", &[(1, 4500), (2, 5500)])],
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::MisconfiguredGroup { .. }));
    }

    #[test]
    fn test_threshold_tier_scan() {
        let rule = rule("crepe", &[(1, 4000), (2, 5500), (3, 6500)]);
        assert_eq!(rule.threshold_tier(0), None);
        assert_eq!(rule.threshold_tier(1), Some(Money::from_cents(4000)));
        assert_eq!(rule.threshold_tier(2), Some(Money::from_cents(5500)));
        assert_eq!(rule.threshold_tier(5), Some(Money::from_cents(6500)));
    }

    #[test]
    fn test_exact_tier_lookup() {
        let rule = rule("blend", &[(1, 4500), (2, 5500)]);
        assert_eq!(rule.exact_tier(2), Some(Money::from_cents(5500)));
        assert_eq!(rule.exact_tier(3), None);
    }

    #[test]
    fn test_required_exclusive_groups() {
        let item = VariantItem {
            id: "latte".to_string(),
            name: "Latte".to_string(),
            category: "drinks".to_string(),
            variants: vec![],
            modifier_groups: vec![
                MILK_GROUP.to_string(),
                "hot_drink_toppings".to_string(),
            ],
        };
        assert_eq!(item.required_exclusive_groups(), vec![MILK_GROUP]);
    }

    #[test]
    fn test_dependent_group_detection() {
        let mut group = plain_group("frappes");
        group.extra_groups = vec![MILK_GROUP.to_string(), "frappe_extras".to_string()];
        assert_eq!(group.dependent_group(), Some(MILK_GROUP));

        let plain = plain_group("crepes");
        assert_eq!(plain.dependent_group(), None);
    }
}
