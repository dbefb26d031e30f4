//! Deterministic collaborators for tests.

use crate::casino::catalog::Catalog;
use crate::casino::{Clock, Randomness};
use stardrop_types::casino::{Case, CatalogItem, DropTableEntry, Rarity};
use std::cell::Cell;
use std::collections::VecDeque;

/// Value returned once a script runs dry.
const EXHAUSTED_VALUE: f64 = 0.5;

/// Replays a fixed sequence of unit draws.
///
/// Identifier bytes come from an internal counter and never consume the script, so tests only
/// need to list the draws that decide outcomes.
pub struct ScriptedRandomness {
    values: VecDeque<f64>,
    counter: u64,
}

impl ScriptedRandomness {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values: values.into(),
            counter: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl Randomness for ScriptedRandomness {
    fn next_unit(&mut self) -> f64 {
        self.values.pop_front().unwrap_or(EXHAUSTED_VALUE)
    }

    fn next_bytes16(&mut self) -> [u8; 16] {
        self.counter += 1;
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.counter.to_be_bytes());
        out[8..].copy_from_slice(&self.counter.to_le_bytes());
        out
    }
}

/// Manually advanced clock.
#[derive(Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.set(now);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

pub fn sample_item(id: u32, price: u64) -> CatalogItem {
    CatalogItem {
        id,
        name: format!("Item {id}"),
        price,
        rarity: Rarity::Common,
        icon: String::new(),
    }
}

pub fn sample_case(key: &str, price: u64, drops: &[(u32, f64)]) -> Case {
    Case {
        key: key.to_string(),
        name: key.to_string(),
        kind: "basic".to_string(),
        price,
        category_icon: String::new(),
        drop_table: drops
            .iter()
            .map(|&(item_id, weight)| DropTableEntry { item_id, weight })
            .collect(),
    }
}

/// Items priced along a rough geometric ladder, plus two cases.
///
/// Item ids equal their position + 1. Prices: 10, 25, 50, 100, 150, 200, 400, 750, 1000,
/// 2500, 5000, 20000.
pub fn test_catalog() -> Catalog {
    let prices = [10, 25, 50, 100, 150, 200, 400, 750, 1_000, 2_500, 5_000, 20_000];
    let items = prices
        .iter()
        .enumerate()
        .map(|(i, &price)| sample_item(i as u32 + 1, price))
        .collect();
    let cases = vec![
        sample_case("starter", 100, &[(4, 70.0), (6, 30.0)]),
        sample_case("premium", 1_000, &[(2, 50.0), (9, 30.0), (11, 15.0), (12, 5.0)]),
    ];
    Catalog::new(items, cases).expect("test catalog is valid")
}
