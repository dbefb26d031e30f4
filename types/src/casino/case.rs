use serde::{Deserialize, Serialize};

use super::CatalogItem;

/// One weighted outcome of a case.
///
/// Weights are relative: they are normalized by the table's actual total, so they need not sum
/// to 100.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DropTableEntry {
    pub item_id: u32,
    pub weight: f64,
}

/// A purchasable loot case.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub price: u64,
    #[serde(default)]
    pub category_icon: String,
    pub drop_table: Vec<DropTableEntry>,
}

impl Case {
    /// Sum of all drop weights.
    pub fn total_weight(&self) -> f64 {
        self.drop_table.iter().map(|entry| entry.weight).sum()
    }

    /// Displayed odds for an item, computed from the real total rather than assuming the
    /// weights add up to 100.
    pub fn display_percent(&self, item_id: u32) -> Option<f64> {
        let total = self.total_weight();
        if total <= 0.0 {
            return None;
        }
        let weight: f64 = self
            .drop_table
            .iter()
            .filter(|entry| entry.item_id == item_id)
            .map(|entry| entry.weight)
            .sum();
        if weight == 0.0 {
            return None;
        }
        Some(weight / total * 100.0)
    }

    /// Total price of opening `quantity` cases, or `None` on overflow.
    pub fn cost(&self, quantity: u32) -> Option<u64> {
        self.price.checked_mul(quantity as u64)
    }
}

/// On-disk layout of the static catalog configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogFile {
    pub items: Vec<CatalogItem>,
    #[serde(default)]
    pub cases: Vec<Case>,
}
