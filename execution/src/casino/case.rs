//! Case opening.
//!
//! Each opening is `quantity` independent draws from the case's drop table. Affordability is
//! checked by the caller before the engine runs.

use super::catalog::Catalog;
use super::sampler::SamplerCache;
use super::{mint_item, GameError, Randomness};
use stardrop_types::casino::{Case, CatalogItem, InventoryItem, STRIP_LENGTH, STRIP_WINNER_INDEX};

/// Draw `quantity` items from `case`, each stamped with a fresh identity and `obtained_at = now`.
pub fn open<R: Randomness>(
    catalog: &Catalog,
    samplers: &mut SamplerCache,
    case: &Case,
    quantity: u32,
    rng: &mut R,
    now: u64,
) -> Result<Vec<InventoryItem>, GameError> {
    let mut drops = Vec::with_capacity(quantity as usize);
    for _ in 0..quantity {
        let entry = samplers.draw(case, rng);
        let item = catalog
            .by_id(entry.item_id)
            .ok_or(GameError::UnknownItem(entry.item_id))?;
        drops.push(mint_item(item, rng, now));
    }
    Ok(drops)
}

/// Presentation strip for the opening animation.
///
/// The resolved `winner` sits at [`STRIP_WINNER_INDEX`]; every other slot is filler sampled from
/// the same drop table. Filler is drawn after the outcome and never affects it.
pub fn build_strip<R: Randomness>(
    catalog: &Catalog,
    samplers: &mut SamplerCache,
    case: &Case,
    winner: &CatalogItem,
    rng: &mut R,
) -> Vec<CatalogItem> {
    (0..STRIP_LENGTH)
        .map(|index| {
            if index == STRIP_WINNER_INDEX {
                return winner.clone();
            }
            let entry = samplers.draw(case, rng);
            catalog
                .by_id(entry.item_id)
                .cloned()
                .unwrap_or_else(|| winner.clone())
        })
        .collect()
}
