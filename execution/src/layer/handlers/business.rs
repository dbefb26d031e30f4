use super::super::*;
use crate::casino::business;
use stardrop_types::casino::BusinessState;
use tracing::{debug, info};

impl<'a, R: Randomness> Layer<'a, R> {
    // === Business ===

    /// Invest in a new business.
    pub fn start_business(
        &mut self,
        investment: u64,
        now: u64,
    ) -> Result<BusinessState, GameError> {
        if self.player.business.active {
            return Err(GameError::BusinessActive);
        }
        if investment < self.config.business.min_investment {
            return Err(GameError::InvalidInvestment(investment));
        }
        if !self.player.can_afford(investment) {
            return Err(GameError::InsufficientFunds {
                have: self.player.balance(),
                need: investment,
            });
        }

        let state = business::start(
            &self.config.business,
            &self.player.business,
            investment,
            &mut self.rng,
            now,
        )?;
        self.player.debit(investment)?;
        self.player.stats.record_spend(investment);
        self.player.business = state.clone();
        self.touch();
        info!(
            investment,
            target_total = state.target_total,
            "business started"
        );
        Ok(state)
    }

    /// Catch the business up to `now`. Drops at most one reward per call.
    ///
    /// Dropped rewards go straight into the inventory; the pending copy only gates the next
    /// drop until claimed. With a full inventory the drop stays due until room is made.
    pub fn advance_business(&mut self, now: u64) -> Vec<BusinessEvent> {
        if self.player.business.is_drop_due(now) && self.ensure_room(1).is_err() {
            debug!(
                items = self.player.inventory.len(),
                "inventory full, business drop deferred"
            );
            return Vec::new();
        }
        let events = business::advance(
            &self.config.business,
            self.catalog,
            &mut self.player.business,
            &mut self.rng,
            now,
        );
        for event in &events {
            match event {
                BusinessEvent::RewardDropped(reward) => {
                    info!(
                        price = reward.price(),
                        earned_total = self.player.business.earned_total,
                        "business reward dropped"
                    );
                    self.award(reward.clone());
                }
                BusinessEvent::Completed {
                    earned_total,
                    target_total,
                } => {
                    info!(earned_total, target_total, "business completed");
                }
            }
        }
        if !events.is_empty() {
            self.touch();
        }
        events
    }

    /// Acknowledge the pending reward and schedule the next drop.
    pub fn claim_business_reward(&mut self, now: u64) -> Result<InventoryItem, GameError> {
        let reward = business::claim(&self.config.business, &mut self.player.business, now)?;
        self.touch();
        Ok(reward)
    }

    /// Clear a completed business.
    pub fn reset_business(&mut self) -> Result<(), GameError> {
        business::reset(&mut self.player.business)?;
        self.touch();
        Ok(())
    }
}
