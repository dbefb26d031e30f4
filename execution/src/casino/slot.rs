//! Slot machine.
//!
//! Each spin offers four symbols sized to the bet: the item found near `bet * multiple` for every
//! configured multiple. Payout odds are solved so that the expected return is `rtp * bet`:
//!
//! `p = rtp * bet / sum(payouts)` per symbol, `4p` in total.
//!
//! A win lands the same symbol on all three reels. A loss always shows different symbols on the
//! first two reels.
//!
//! Round flow: [`prepare`] (`PreSpin`), [`spin`] (`Spinning`), [`finish`] (`Finished`).

use super::catalog::Catalog;
use super::{mint_item, GameError, Randomness};
use crate::config::SlotConfig;
use stardrop_types::casino::{SlotRoundState, SlotStatus, SlotVariant, SLOT_REELS, SLOT_VARIANTS};

/// Solved odds for a variant set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Odds {
    /// Probability of landing one particular symbol.
    pub per_variant: f64,
    /// Combined win probability, at most 1.
    pub total: f64,
    /// Set when `4p` exceeded 1 and was clamped (the effective RTP falls short).
    pub clamped: bool,
}

/// Pick the four symbols for `bet`.
pub fn build_variants<R: Randomness>(
    config: &SlotConfig,
    catalog: &Catalog,
    bet: u64,
    rng: &mut R,
) -> [SlotVariant; SLOT_VARIANTS] {
    config.bet_multiples.map(|multiple| {
        let item = catalog
            .random_near(
                bet as f64 * multiple,
                config.tolerance_low,
                config.tolerance_high,
                rng,
            )
            .clone();
        SlotVariant {
            payout: item.price,
            item,
        }
    })
}

/// Solve the per-symbol probability for `rtp` and clamp the total to 1.
pub fn odds(rtp: f64, bet: u64, variants: &[SlotVariant; SLOT_VARIANTS]) -> Odds {
    let payouts: u64 = variants.iter().map(|variant| variant.payout).sum();
    if payouts == 0 {
        // Nothing of value can be won; every spin "wins" a zero-priced symbol
        return Odds {
            per_variant: 1.0 / SLOT_VARIANTS as f64,
            total: 1.0,
            clamped: true,
        };
    }
    let per_variant = rtp * bet as f64 / payouts as f64;
    let total = per_variant * SLOT_VARIANTS as f64;
    if total > 1.0 {
        return Odds {
            per_variant: 1.0 / SLOT_VARIANTS as f64,
            total: 1.0,
            clamped: true,
        };
    }
    Odds {
        per_variant,
        total,
        clamped: false,
    }
}

/// Validate the bet and lay out the symbols for a spin.
pub fn prepare<R: Randomness>(
    config: &SlotConfig,
    catalog: &Catalog,
    bet: u64,
    rng: &mut R,
) -> Result<(SlotRoundState, Odds), GameError> {
    if !(config.min_bet..=config.max_bet).contains(&bet) {
        return Err(GameError::InvalidBet(bet));
    }
    let variants = build_variants(config, catalog, bet, rng);
    let odds = odds(config.rtp, bet, &variants);
    let round = SlotRoundState {
        status: SlotStatus::PreSpin,
        bet,
        variants,
        win_probability: odds.total,
        reels: [0; SLOT_REELS],
        winning_item: None,
        minted: None,
    };
    Ok((round, odds))
}

/// Draw the reel outcome.
pub fn spin<R: Randomness>(round: &mut SlotRoundState, rng: &mut R) {
    if round.status != SlotStatus::PreSpin {
        return;
    }
    let draw = rng.next_unit();
    if draw < round.win_probability {
        let index = ((draw / round.win_probability * SLOT_VARIANTS as f64) as usize)
            .min(SLOT_VARIANTS - 1);
        round.reels = [index; SLOT_REELS];
        round.winning_item = Some(round.variants[index].item.clone());
    } else {
        round.reels = losing_reels(rng);
        round.winning_item = None;
    }
    round.status = SlotStatus::Spinning;
}

/// Reels for a loss: the first two always differ, the third is unconstrained.
fn losing_reels<R: Randomness>(rng: &mut R) -> [usize; SLOT_REELS] {
    let first = rng.next_index(SLOT_VARIANTS);
    let mut second = rng.next_index(SLOT_VARIANTS - 1);
    if second >= first {
        second += 1;
    }
    let third = rng.next_index(SLOT_VARIANTS);
    [first, second, third]
}

/// Settle a spun round, minting the winning symbol's item.
pub fn finish<R: Randomness>(round: &mut SlotRoundState, rng: &mut R, now: u64) {
    if round.status != SlotStatus::Spinning {
        return;
    }
    round.minted = round
        .winning_item
        .as_ref()
        .map(|item| mint_item(item, rng, now));
    round.status = SlotStatus::Finished;
}

/// Symbol strip for one animated reel.
///
/// `resolved` sits at `target_index`; every other position is uniform filler. Filler is drawn
/// after the outcome and never affects it.
pub fn reel_strip<R: Randomness>(
    resolved: usize,
    length: usize,
    target_index: usize,
    rng: &mut R,
) -> Vec<usize> {
    (0..length)
        .map(|index| {
            if index == target_index {
                resolved
            } else {
                rng.next_index(SLOT_VARIANTS)
            }
        })
        .collect()
}
