//! Upgrade wheel.
//!
//! Win probability is `stake.price / target.price`. The outcome is a Bernoulli draw made before
//! anything else; the landing angle is then drawn inside the matching sector so the wheel agrees
//! with the outcome. Resolution only ever reads the stored `won` flag.
//!
//! Wheel layout: the win sector is `[0, 360 * p)`, the lose sector is the rest.

use super::{mint_item, GameError, Randomness};
use crate::config::UpgradeConfig;
use stardrop_types::casino::{CatalogItem, InventoryItem, UpgradeRoundState, UpgradeStatus};

const FULL_TURN: f64 = 360.0;

/// Probability of upgrading `stake_price` into `target_price`.
///
/// The target must be priced strictly above a non-zero stake.
pub fn win_probability(stake_price: u64, target_price: u64) -> Result<f64, GameError> {
    if stake_price == 0 || target_price <= stake_price {
        return Err(GameError::InvalidTarget);
    }
    Ok(stake_price as f64 / target_price as f64)
}

/// Uniform angle inside `[start, start + width)`, kept `min(inset, width / 4)` away from both
/// edges.
fn angle_in_sector(start: f64, width: f64, inset: f64, unit: f64) -> f64 {
    let inset = inset.min(width / 4.0);
    start + inset + unit * (width - 2.0 * inset)
}

/// Whether `rotation` (any number of turns) lands in the win sector.
pub fn lands_in_win_sector(win_probability: f64, rotation: f64) -> bool {
    rotation.rem_euclid(FULL_TURN) < FULL_TURN * win_probability
}

/// Draw the outcome and wheel presentation for one spin.
///
/// The returned round is `Spinning`; [`resolve`] settles it.
pub fn spin<R: Randomness>(
    config: &UpgradeConfig,
    stake: InventoryItem,
    target: &CatalogItem,
    rng: &mut R,
) -> Result<UpgradeRoundState, GameError> {
    let p = win_probability(stake.price(), target.price)?;
    let won = rng.next_unit() < p;

    let win_width = FULL_TURN * p;
    let unit = rng.next_unit();
    let landing_angle_degrees = if won {
        angle_in_sector(0.0, win_width, config.edge_inset_degrees, unit)
    } else {
        angle_in_sector(
            win_width,
            FULL_TURN - win_width,
            config.edge_inset_degrees,
            unit,
        )
    };
    let spins = rng.next_in_range(config.min_full_spins..=config.max_full_spins);

    Ok(UpgradeRoundState {
        status: UpgradeStatus::Spinning,
        stake_item: stake,
        target_item: target.clone(),
        win_probability: p,
        won,
        landing_angle_degrees,
        total_rotation_degrees: FULL_TURN * spins as f64 + landing_angle_degrees,
        minted: None,
    })
}

/// Settle a spinning round from its stored flag, minting the target on a win.
pub fn resolve<R: Randomness>(round: &mut UpgradeRoundState, rng: &mut R, now: u64) {
    if round.status != UpgradeStatus::Spinning {
        return;
    }
    if round.won {
        round.status = UpgradeStatus::Win;
        round.minted = Some(mint_item(&round.target_item, rng, now));
    } else {
        round.status = UpgradeStatus::Lose;
    }
}
