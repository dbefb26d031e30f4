//! Item catalog and price-proximity resolution.
//!
//! The catalog is built once from static configuration and passed by reference to every engine.
//! Construction rejects empty catalogs, so "closest by price" lookups always have an answer.

use super::Randomness;
use crate::config::ConfigError;
use stardrop_types::casino::{
    Case, CatalogFile, CatalogItem, MAX_ICON_LENGTH, MAX_NAME_LENGTH,
};
use std::collections::HashMap;

/// Immutable lookup of items and cases.
#[derive(Clone, Debug)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    by_id: HashMap<u32, usize>,
    cases: Vec<Case>,
    by_key: HashMap<String, usize>,
}

impl Catalog {
    /// Build and validate a catalog.
    ///
    /// Item order is preserved: it decides ties in [`Catalog::closest_by_price`].
    pub fn new(items: Vec<CatalogItem>, cases: Vec<Case>) -> Result<Self, ConfigError> {
        if items.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        let mut by_id = HashMap::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if by_id.insert(item.id, index).is_some() {
                return Err(ConfigError::DuplicateItem(item.id));
            }
            validate_item(item)?;
        }

        let mut by_key = HashMap::with_capacity(cases.len());
        for (index, case) in cases.iter().enumerate() {
            if by_key.insert(case.key.clone(), index).is_some() {
                return Err(ConfigError::DuplicateCase(case.key.clone()));
            }
            validate_case(case, &by_id)?;
        }

        Ok(Self {
            items,
            by_id,
            cases,
            by_key,
        })
    }

    pub fn from_file(file: CatalogFile) -> Result<Self, ConfigError> {
        Self::new(file.items, file.cases)
    }

    pub fn by_id(&self, id: u32) -> Option<&CatalogItem> {
        self.by_id.get(&id).map(|&index| &self.items[index])
    }

    pub fn case(&self, key: &str) -> Option<&Case> {
        self.by_key.get(key).map(|&index| &self.cases[index])
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    /// Item whose price is closest to `target`. Ties go to the first item in catalog order.
    pub fn closest_by_price(&self, target: f64) -> &CatalogItem {
        let mut best = &self.items[0];
        let mut best_distance = (best.price as f64 - target).abs();
        for item in &self.items[1..] {
            let distance = (item.price as f64 - target).abs();
            if distance < best_distance {
                best = item;
                best_distance = distance;
            }
        }
        best
    }

    /// Items priced within `[target * low, target * high]`, in catalog order.
    pub fn items_in_band(&self, target: f64, low: f64, high: f64) -> Vec<&CatalogItem> {
        let (min, max) = (target * low, target * high);
        self.items
            .iter()
            .filter(|item| {
                let price = item.price as f64;
                price >= min && price <= max
            })
            .collect()
    }

    /// Uniformly random item priced within the tolerance band around `target`, falling back to
    /// [`Catalog::closest_by_price`] when the band is empty.
    pub fn random_near<R: Randomness>(
        &self,
        target: f64,
        low: f64,
        high: f64,
        rng: &mut R,
    ) -> &CatalogItem {
        let matches = self.items_in_band(target, low, high);
        if matches.is_empty() {
            return self.closest_by_price(target);
        }
        matches[rng.next_index(matches.len())]
    }
}

/// Names and icons are persisted with every owned item, so they must fit the codec bounds.
fn validate_item(item: &CatalogItem) -> Result<(), ConfigError> {
    for (field, value, max) in [
        ("name", &item.name, MAX_NAME_LENGTH),
        ("icon", &item.icon, MAX_ICON_LENGTH),
    ] {
        if value.len() > max {
            return Err(ConfigError::FieldTooLong {
                item: item.id,
                field,
                len: value.len(),
                max,
            });
        }
    }
    Ok(())
}

fn validate_case(case: &Case, items: &HashMap<u32, usize>) -> Result<(), ConfigError> {
    if case.drop_table.is_empty() {
        return Err(ConfigError::EmptyDropTable(case.key.clone()));
    }
    for entry in &case.drop_table {
        if !items.contains_key(&entry.item_id) {
            return Err(ConfigError::UnknownDropItem {
                case: case.key.clone(),
                item: entry.item_id,
            });
        }
        if !entry.weight.is_finite() || entry.weight <= 0.0 {
            return Err(ConfigError::InvalidWeight {
                case: case.key.clone(),
                item: entry.item_id,
            });
        }
    }
    Ok(())
}
