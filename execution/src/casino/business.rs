//! Passive income ("business").
//!
//! An investment buys a stream of item rewards until their combined value exceeds a randomly
//! drawn target. Rewards drop one tick after the previous one is claimed.
//!
//! Time is reconciled, not accumulated: [`advance`] is a pure function of the stored state and
//! `now`, and is called both from a live timer and on resume. A call produces at most one reward
//! no matter how far `now` is past the scheduled drop, and nothing further drops until the
//! pending reward is claimed.

use super::catalog::Catalog;
use super::{mint_item, GameError, Randomness};
use crate::config::BusinessConfig;
use stardrop_types::casino::{BusinessState, InventoryItem};

/// Something that happened during [`advance`].
#[derive(Clone, Debug, PartialEq)]
pub enum BusinessEvent {
    /// A reward was minted. The caller adds it to the inventory immediately.
    RewardDropped(InventoryItem),
    /// Earnings exceeded the target; the business stopped.
    Completed { earned_total: u64, target_total: u64 },
}

/// Start a business with `investment`. The caller deducts the investment.
pub fn start<R: Randomness>(
    config: &BusinessConfig,
    state: &BusinessState,
    investment: u64,
    rng: &mut R,
    now: u64,
) -> Result<BusinessState, GameError> {
    if state.active {
        return Err(GameError::BusinessActive);
    }
    if investment < config.min_investment {
        return Err(GameError::InvalidInvestment(investment));
    }
    let span = config.max_target_multiplier - config.min_target_multiplier;
    let multiplier = config.min_target_multiplier + rng.next_unit() * span;
    let target_total = ((investment as f64 * multiplier).round() as u64).max(1);

    Ok(BusinessState {
        active: true,
        investment,
        target_total,
        earned_total: 0,
        next_drop_at: Some(now.saturating_add(config.tick_ms)),
        pending_reward: None,
        completed_at: None,
        rewards_count: 0,
    })
}

/// Reward target price for a drawn percent of the investment.
pub fn reward_target_price(investment: u64, percent: u32) -> u64 {
    (investment.saturating_mul(percent as u64) / 100).max(1)
}

/// Reconcile `state` with `now`, dropping at most one reward.
///
/// A missed drop is stamped with its nominal `next_drop_at`, not with `now`.
pub fn advance<R: Randomness>(
    config: &BusinessConfig,
    catalog: &Catalog,
    state: &mut BusinessState,
    rng: &mut R,
    now: u64,
) -> Vec<BusinessEvent> {
    if !state.is_drop_due(now) {
        return Vec::new();
    }
    let due_at = state.next_drop_at.unwrap_or(now);

    let percent = rng.next_in_range(config.min_reward_percent..=config.max_reward_percent);
    let target = reward_target_price(state.investment, percent);
    let reward = mint_item(catalog.closest_by_price(target as f64), rng, due_at);

    state.earned_total = state.earned_total.saturating_add(reward.price());
    state.rewards_count = state.rewards_count.saturating_add(1);
    state.next_drop_at = None;

    let mut events = vec![BusinessEvent::RewardDropped(reward.clone())];
    if state.earned_total > state.target_total {
        state.active = false;
        state.completed_at = Some(now);
        state.pending_reward = None;
        events.push(BusinessEvent::Completed {
            earned_total: state.earned_total,
            target_total: state.target_total,
        });
    } else {
        state.pending_reward = Some(reward);
    }
    events
}

/// Acknowledge the pending reward and schedule the next drop.
pub fn claim(
    config: &BusinessConfig,
    state: &mut BusinessState,
    now: u64,
) -> Result<InventoryItem, GameError> {
    let reward = state
        .pending_reward
        .take()
        .ok_or(GameError::NoPendingReward)?;
    if state.active {
        state.next_drop_at = Some(now.saturating_add(config.tick_ms));
    }
    Ok(reward)
}

/// Clear a completed business so a new one can start.
pub fn reset(state: &mut BusinessState) -> Result<(), GameError> {
    if state.active {
        return Err(GameError::BusinessNotComplete);
    }
    *state = BusinessState::default();
    Ok(())
}

/// Milliseconds until the next drop, clamped at zero. `None` if nothing is scheduled.
pub fn time_until_drop(state: &BusinessState, now: u64) -> Option<u64> {
    state.next_drop_at.map(|at| at.saturating_sub(now))
}
