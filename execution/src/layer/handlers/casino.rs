use super::super::*;
use crate::casino::{case, crash, slot, upgrade};
use stardrop_types::casino::{CrashStatus, REEL_STRIP_LENGTH, REEL_TARGET_INDEX};
use tracing::{info, warn};

impl<'a, R: Randomness> Layer<'a, R> {
    // === Cases ===

    /// Buy and open `quantity` cases.
    pub fn open_case(
        &mut self,
        key: &str,
        quantity: u32,
        now: u64,
    ) -> Result<Vec<InventoryItem>, GameError> {
        if quantity == 0 || quantity > self.config.cases.max_quantity {
            return Err(GameError::InvalidQuantity(quantity));
        }
        let case = self
            .catalog
            .case(key)
            .ok_or_else(|| GameError::UnknownCase(key.to_string()))?;
        let cost = case.cost(quantity).ok_or(GameError::InsufficientFunds {
            have: self.player.balance(),
            need: u64::MAX,
        })?;
        if !self.player.can_afford(cost) {
            return Err(GameError::InsufficientFunds {
                have: self.player.balance(),
                need: cost,
            });
        }
        self.ensure_room(quantity as usize)?;

        let items = case::open(
            self.catalog,
            &mut self.samplers,
            case,
            quantity,
            &mut self.rng,
            now,
        )?;
        self.player.debit(cost)?;
        self.player.stats.record_spend(cost);
        self.player.stats.record_cases_opened(quantity as u64);
        for item in &items {
            self.award(item.clone());
        }
        self.touch();
        info!(case = key, quantity, cost, "opened cases");
        Ok(items)
    }

    /// Presentation strip for an opening of `key` that resolved to `winner`.
    pub fn case_strip(
        &mut self,
        key: &str,
        winner: &CatalogItem,
    ) -> Result<Vec<CatalogItem>, GameError> {
        let case = self
            .catalog
            .case(key)
            .ok_or_else(|| GameError::UnknownCase(key.to_string()))?;
        Ok(case::build_strip(
            self.catalog,
            &mut self.samplers,
            case,
            winner,
            &mut self.rng,
        ))
    }

    // === Crash ===

    /// Stake an inventory item on a new crash flight.
    ///
    /// The stake stays in the inventory (locked) until the round resolves.
    pub fn start_crash(&mut self, stake: &Uuid, now: u64) -> Result<CrashRoundState, GameError> {
        if self.locked_item().is_some() {
            return Err(GameError::RoundInProgress);
        }
        let stake = self.stake_item(stake)?;
        let price = stake.price();
        let round = crash::start(&self.config.crash, stake, &mut self.rng, now);
        self.player.stats.record_spend(price);
        self.touch();
        info!(
            stake = price,
            crash_point = round.crash_point,
            "crash round started"
        );
        self.crash = Some(round.clone());
        Ok(round)
    }

    /// Advance the flight to `now`. A crash burns the stake.
    ///
    /// Returns `None` if no round has been played.
    pub fn crash_tick(&mut self, now: u64) -> Option<CrashStatus> {
        let round = self.crash.as_mut()?;
        if !round.is_flying() {
            return Some(round.status);
        }
        let status = crash::tick(&self.config.crash, round, now);
        if status == CrashStatus::Crashed {
            let stake = round.stake.unique_id;
            let crash_point = round.crash_point;
            self.burn_stake(&stake);
            info!(crash_point, "crashed");
        }
        Some(status)
    }

    /// Cash out the flying round at `now`.
    pub fn crash_cash_out(&mut self, now: u64) -> Result<CashOut, GameError> {
        let round = self
            .crash
            .as_mut()
            .filter(|round| round.is_flying())
            .ok_or(GameError::NotFlying)?;
        let result = crash::cash_out(&self.config.crash, self.catalog, round, &mut self.rng, now)?;
        let stake = round.stake.unique_id;
        self.burn_stake(&stake);
        match &result {
            CashOut::CashedOut {
                multiplier,
                winnings,
                ..
            } => {
                info!(multiplier, won = winnings.price(), "cashed out");
                self.award(winnings.clone());
            }
            CashOut::Crashed { crash_point } => {
                info!(crash_point, "cash out too late, crashed");
            }
        }
        Ok(result)
    }

    fn burn_stake(&mut self, stake: &Uuid) {
        if self.player.remove_item(stake).is_err() {
            warn!(%stake, "staked item missing from inventory");
        }
        self.touch();
    }

    // === Upgrade ===

    /// Spin the wheel to upgrade `stake` into catalog item `target`.
    pub fn upgrade(
        &mut self,
        stake: &Uuid,
        target: u32,
        now: u64,
    ) -> Result<UpgradeRoundState, GameError> {
        let stake = self.stake_item(stake)?;
        let target = self.catalog_item(target)?;
        let mut round = upgrade::spin(&self.config.upgrade, stake, &target, &mut self.rng)?;
        upgrade::resolve(&mut round, &mut self.rng, now);

        let stake_id = round.stake_item.unique_id;
        self.player.remove_item(&stake_id)?;
        self.player.stats.record_spend(round.stake_item.price());
        if let Some(minted) = &round.minted {
            self.award(minted.clone());
        }
        self.touch();
        info!(
            stake = round.stake_item.price(),
            target = target.price,
            win_probability = round.win_probability,
            won = round.won,
            "upgrade resolved"
        );
        Ok(round)
    }

    // === Slots ===

    /// Spin the slot machine for `bet`. The bet is deducted whatever the outcome.
    pub fn slot_spin(&mut self, bet: u64, now: u64) -> Result<SlotRoundState, GameError> {
        let slot_config = &self.config.slot;
        if !(slot_config.min_bet..=slot_config.max_bet).contains(&bet) {
            return Err(GameError::InvalidBet(bet));
        }
        if !self.player.can_afford(bet) {
            return Err(GameError::InsufficientFunds {
                have: self.player.balance(),
                need: bet,
            });
        }
        self.ensure_room(1)?;

        let (mut round, odds) = slot::prepare(slot_config, self.catalog, bet, &mut self.rng)?;
        if odds.clamped {
            warn!(
                bet,
                per_variant = odds.per_variant,
                "slot win probability clamped to 1, rtp falls short"
            );
        }
        self.player.debit(bet)?;
        self.player.stats.record_spend(bet);

        slot::spin(&mut round, &mut self.rng);
        slot::finish(&mut round, &mut self.rng, now);
        if let Some(minted) = &round.minted {
            self.award(minted.clone());
        }
        self.touch();
        info!(bet, reels = ?round.reels, won = round.is_win(), "slot spun");
        Ok(round)
    }

    /// Presentation strips for a spun round, one per reel, with each reel's landed symbol at
    /// [`REEL_TARGET_INDEX`].
    pub fn slot_reel_strips(&mut self, round: &SlotRoundState) -> Vec<Vec<CatalogItem>> {
        round
            .reels
            .iter()
            .map(|&landed| {
                slot::reel_strip(landed, REEL_STRIP_LENGTH, REEL_TARGET_INDEX, &mut self.rng)
                    .into_iter()
                    .map(|variant| round.variants[variant].item.clone())
                    .collect()
            })
            .collect()
    }
}
