//! # Seed Catalog
//!
//! The bundled sample menu, mirroring the shop's real card closely enough to
//! exercise every composition kind: a threshold-priced crepe builder, an
//! exact-count blend, an exclusive-choice frappe with the conditional milk
//! dependency, fixed-price desserts and a variant-priced tea.
//!
//! Used by the demo binary and by integration tests; a deployment loads its
//! real collections through [`crate::catalog::load_catalog`] instead.

use dulce_core::catalog::CatalogSnapshot;
use dulce_core::error::CatalogError;

use crate::catalog::load_catalog;

const MENU_GROUPS: &str = r#"[
  {
    "id": "build_your_own_crepe",
    "name": "Build Your Own Crepe",
    "parent": "root",
    "price_rule": "crepe_rule",
    "composition": { "kind": "threshold_count" },
    "base_group": "sweet_crepe_base",
    "topping_groups": ["crepe_toppings"]
  },
  {
    "id": "double_blend",
    "name": "Double Blend",
    "parent": "root",
    "price_rule": "blend_rule",
    "composition": { "kind": "exact_count", "required": 2 },
    "base_group": "blend_ingredients",
    "extra_groups": ["milk_options"]
  },
  {
    "id": "frappes",
    "name": "Frappe",
    "parent": "root",
    "price": 5000,
    "composition": { "kind": "exclusive_choice" },
    "base_group": "frappe_flavors",
    "extra_groups": ["milk_options", "frappe_extras"]
  },
  { "id": "desserts", "name": "Desserts", "parent": "root" },
  { "id": "drinks", "name": "Drinks", "parent": "root" }
]"#;

const MENU_ITEMS: &str = r#"[
  { "id": "brownie", "name": "Brownie", "category": "desserts", "price": 2500 },
  { "id": "flan", "name": "Flan", "category": "desserts", "price": 3000 },
  {
    "id": "iced_tea",
    "name": "Iced Tea",
    "category": "drinks",
    "variants": [
      { "name": "Medium", "price": 3000 },
      { "name": "Large", "price": 3500 }
    ],
    "modifier_groups": ["tea_flavor", "cold_drink_toppings"]
  }
]"#;

const MODIFIERS: &str = r#"[
  { "id": "nutella", "name": "Nutella", "price": 0, "group": "sweet_crepe_base" },
  { "id": "banana", "name": "Banana", "price": 0, "group": "sweet_crepe_base" },
  { "id": "strawberry", "name": "Strawberry", "price": 0, "group": "sweet_crepe_base" },
  { "id": "ice_cream", "name": "Ice Cream Scoop", "price": 800, "group": "crepe_toppings" },
  { "id": "whipped_cream", "name": "Whipped Cream", "price": 500, "group": "crepe_toppings" },
  { "id": "mango", "name": "Mango", "price": 0, "group": "blend_ingredients" },
  { "id": "berry", "name": "Berry", "price": 0, "group": "blend_ingredients" },
  { "id": "banana_blend", "name": "Banana", "price": 0, "group": "blend_ingredients" },
  { "id": "mocha", "name": "Mocha", "price": 0, "group": "frappe_flavors" },
  { "id": "taro", "name": "Taro", "price": 0, "group": "frappe_flavors" },
  {
    "id": "lime_soda",
    "name": "Lime Soda",
    "price": 0,
    "group": "frappe_flavors",
    "exempt_from_dependent": true
  },
  { "id": "whole_milk", "name": "Whole Milk", "price": 0, "group": "milk_options" },
  { "id": "oat_milk", "name": "Oat Milk", "price": 300, "group": "milk_options" },
  { "id": "pearls", "name": "Tapioca Pearls", "price": 500, "group": "frappe_extras" },
  { "id": "jasmine", "name": "Jasmine", "price": 0, "group": "tea_flavor" },
  { "id": "peach", "name": "Peach", "price": 0, "group": "tea_flavor" },
  { "id": "tea_pearls", "name": "Tapioca Pearls", "price": 500, "group": "cold_drink_toppings" }
]"#;

const PRICE_RULES: &str = r#"[
  {
    "id": "crepe_rule",
    "name": "Crepe Bases",
    "tiers": [
      { "count": 1, "price": 4000 },
      { "count": 2, "price": 5500 },
      { "count": 3, "price": 6500 }
    ]
  },
  {
    "id": "blend_rule",
    "name": "Blend Ingredients",
    "tiers": [
      { "count": 1, "price": 4500 },
      { "count": 2, "price": 5500 }
    ]
  }
]"#;

/// Builds the validated sample catalog.
pub fn sample_catalog() -> Result<CatalogSnapshot, CatalogError> {
    load_catalog(MENU_GROUPS, MENU_ITEMS, MODIFIERS, PRICE_RULES)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dulce_core::catalog::{Composition, MenuItem, MILK_GROUP};

    #[test]
    fn test_sample_covers_every_composition_kind() {
        let catalog = sample_catalog().unwrap();

        let crepe = catalog.group("build_your_own_crepe").unwrap();
        assert_eq!(crepe.composition, Some(Composition::ThresholdCount));

        let blend = catalog.group("double_blend").unwrap();
        assert_eq!(
            blend.composition,
            Some(Composition::ExactCount { required: 2 })
        );
        assert_eq!(blend.dependent_group(), Some(MILK_GROUP));

        let frappe = catalog.group("frappes").unwrap();
        assert_eq!(frappe.composition, Some(Composition::ExclusiveChoice));
    }

    #[test]
    fn test_sample_item_shapes() {
        let catalog = sample_catalog().unwrap();
        assert!(matches!(catalog.item("brownie"), Some(MenuItem::Fixed(_))));
        assert!(matches!(
            catalog.item("iced_tea"),
            Some(MenuItem::Variants(v)) if v.variants.len() == 2
        ));
    }

    #[test]
    fn test_exempt_flavor_is_flagged() {
        let catalog = sample_catalog().unwrap();
        assert!(catalog.modifier("lime_soda").unwrap().exempt_from_dependent);
        assert!(!catalog.modifier("mocha").unwrap().exempt_from_dependent);
    }
}
