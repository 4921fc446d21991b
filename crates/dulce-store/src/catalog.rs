//! # Catalog Loader
//!
//! Parses the four raw menu collections from JSON and hands them to
//! [`CatalogSnapshot::ingest`] for validation. Load-once: the snapshot is
//! built at session start and shared read-only for the rest of the day.

use tracing::info;

use dulce_core::catalog::{CatalogSnapshot, MenuGroup, Modifier, PriceRule, RawMenuItem};
use dulce_core::error::CatalogError;

/// Parses and validates the four menu collections.
///
/// Any parse or invariant failure aborts the whole load; a catalog is never
/// partially usable.
pub fn load_catalog(
    groups_json: &str,
    items_json: &str,
    modifiers_json: &str,
    rules_json: &str,
) -> Result<CatalogSnapshot, CatalogError> {
    let groups: Vec<MenuGroup> = parse("menu_groups", groups_json)?;
    let items: Vec<RawMenuItem> = parse("menu_items", items_json)?;
    let modifiers: Vec<Modifier> = parse("modifiers", modifiers_json)?;
    let rules: Vec<PriceRule> = parse("price_rules", rules_json)?;

    let snapshot = CatalogSnapshot::ingest(groups, items, modifiers, rules)?;
    let (groups, items, modifiers, rules) = snapshot.counts();
    info!(groups, items, modifiers, rules, "catalog loaded");
    Ok(snapshot)
}

fn parse<T: serde::de::DeserializeOwned>(
    collection: &'static str,
    json: &str,
) -> Result<Vec<T>, CatalogError> {
    serde_json::from_str(json).map_err(|e| CatalogError::Parse {
        collection,
        message: e.to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
