//! Weighted sampling over drop tables.
//!
//! A [`WeightedSampler`] precomputes cumulative weights once and answers each draw with a binary
//! search. The distribution is identical to a linear scan weighted by `weight / total`.

use super::Randomness;
use stardrop_types::casino::{Case, DropTableEntry};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
pub struct WeightedSampler {
    cumulative: Vec<f64>,
    total: f64,
}

impl WeightedSampler {
    /// Build from weights in table order. Weights are relative and need not sum to 100.
    pub fn new(weights: impl IntoIterator<Item = f64>) -> Self {
        let mut total = 0.0;
        let cumulative = weights
            .into_iter()
            .map(|weight| {
                total += weight;
                total
            })
            .collect();
        Self { cumulative, total }
    }

    pub fn from_drop_table(table: &[DropTableEntry]) -> Self {
        Self::new(table.iter().map(|entry| entry.weight))
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Index of the first bucket whose cumulative weight is >= `unit * total`.
    ///
    /// Falls back to the last entry if rounding pushes the scaled draw past every bucket.
    pub fn draw(&self, unit: f64) -> usize {
        let needle = unit * self.total;
        let index = self.cumulative.partition_point(|&bucket| bucket < needle);
        index.min(self.cumulative.len().saturating_sub(1))
    }

    pub fn sample<R: Randomness>(&self, rng: &mut R) -> usize {
        self.draw(rng.next_unit())
    }
}

/// Samplers cached per case key.
///
/// A cached sampler is rebuilt if the case's drop table changes length.
#[derive(Default)]
pub struct SamplerCache {
    samplers: HashMap<String, WeightedSampler>,
}

impl SamplerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, case: &Case) -> &WeightedSampler {
        let sampler = self
            .samplers
            .entry(case.key.clone())
            .or_insert_with(|| WeightedSampler::from_drop_table(&case.drop_table));
        if sampler.len() != case.drop_table.len() {
            *sampler = WeightedSampler::from_drop_table(&case.drop_table);
        }
        sampler
    }

    /// Draw one entry from a case's drop table.
    pub fn draw<'c, R: Randomness>(&mut self, case: &'c Case, rng: &mut R) -> &'c DropTableEntry {
        let index = self.get(case).sample(rng);
        &case.drop_table[index]
    }

    pub fn len(&self) -> usize {
        self.samplers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samplers.is_empty()
    }
}
