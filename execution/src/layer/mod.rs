use crate::casino::{
    business::BusinessEvent, catalog::Catalog, crash::CashOut, sampler::SamplerCache, GameError,
    Randomness,
};
use crate::config::GameConfig;
use stardrop_types::casino::{
    CatalogItem, CrashRoundState, InventoryItem, Player, SlotRoundState, UpgradeRoundState,
    MAX_INVENTORY_ITEMS,
};
use tracing::debug;
use uuid::Uuid;

mod handlers;

/// A player action.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    OpenCase { case: String, quantity: u32 },
    StartCrash { stake: Uuid },
    CrashCashOut,
    Upgrade { stake: Uuid, target: u32 },
    SlotSpin { bet: u64 },
    StartBusiness { investment: u64 },
    ClaimBusinessReward,
    ResetBusiness,
    SellItems { items: Vec<Uuid> },
    SellAll,
}

/// The resolved result of an [`Action`].
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    CaseOpened { items: Vec<InventoryItem> },
    CrashStarted { round: CrashRoundState },
    CrashResolved { result: CashOut },
    Upgraded { round: UpgradeRoundState },
    SlotSpun { round: SlotRoundState },
    BusinessStarted { target_total: u64, next_drop_at: u64 },
    BusinessRewardClaimed { reward: InventoryItem },
    BusinessReset,
    Sold { count: usize, proceeds: u64 },
}

/// Single-player orchestrator.
///
/// Every handler checks its preconditions first and returns a [`GameError`] without touching
/// the player; once checks pass, the ledger mutation and the engine outcome are applied
/// together.
pub struct Layer<'a, R: Randomness> {
    catalog: &'a Catalog,
    config: &'a GameConfig,
    rng: R,
    player: Player,
    samplers: SamplerCache,
    crash: Option<CrashRoundState>,
    dirty: bool,
}

impl<'a, R: Randomness> Layer<'a, R> {
    /// `config` must already have passed [`GameConfig::validate`] against `catalog`.
    pub fn new(catalog: &'a Catalog, config: &'a GameConfig, rng: R, player: Player) -> Self {
        Self {
            catalog,
            config,
            rng,
            player,
            samplers: SamplerCache::new(),
            crash: None,
            dirty: false,
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn into_player(self) -> Player {
        self.player
    }

    pub fn catalog(&self) -> &Catalog {
        self.catalog
    }

    /// The current (or most recently resolved) crash round.
    pub fn crash_round(&self) -> Option<&CrashRoundState> {
        self.crash.as_ref()
    }

    /// Returns whether the player changed since the last call, and clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn touch(&mut self) {
        self.dirty = true;
    }

    /// Item staked in a flying crash round, if any.
    fn locked_item(&self) -> Option<Uuid> {
        self.crash
            .as_ref()
            .filter(|round| round.is_flying())
            .map(|round| round.stake.unique_id)
    }

    fn ensure_unlocked(&self, item: &Uuid) -> Result<(), GameError> {
        if self.locked_item() == Some(*item) {
            return Err(GameError::ItemLocked(*item));
        }
        Ok(())
    }

    /// Refuse actions that could mint past the persisted inventory bound.
    fn ensure_room(&self, incoming: usize) -> Result<(), GameError> {
        if !self.player.has_room_for(incoming) {
            return Err(GameError::InventoryFull {
                len: self.player.inventory.len(),
                max: MAX_INVENTORY_ITEMS,
            });
        }
        Ok(())
    }

    /// Look up a wagerable inventory item.
    fn stake_item(&self, item: &Uuid) -> Result<InventoryItem, GameError> {
        self.ensure_unlocked(item)?;
        self.player
            .find_item(item)
            .cloned()
            .ok_or(GameError::ItemNotFound(*item))
    }

    fn catalog_item(&self, id: u32) -> Result<CatalogItem, GameError> {
        self.catalog
            .by_id(id)
            .cloned()
            .ok_or(GameError::UnknownItem(id))
    }

    /// Credit a minted win to the inventory and stats.
    fn award(&mut self, item: InventoryItem) {
        self.player.stats.record_win(item.price());
        self.player.add_item(item);
    }

    /// Apply an action at `now`.
    pub fn apply(&mut self, action: Action, now: u64) -> Result<Outcome, GameError> {
        let result = match action {
            Action::OpenCase { case, quantity } => self
                .open_case(&case, quantity, now)
                .map(|items| Outcome::CaseOpened { items }),
            Action::StartCrash { stake } => self
                .start_crash(&stake, now)
                .map(|round| Outcome::CrashStarted { round }),
            Action::CrashCashOut => self
                .crash_cash_out(now)
                .map(|result| Outcome::CrashResolved { result }),
            Action::Upgrade { stake, target } => self
                .upgrade(&stake, target, now)
                .map(|round| Outcome::Upgraded { round }),
            Action::SlotSpin { bet } => self
                .slot_spin(bet, now)
                .map(|round| Outcome::SlotSpun { round }),
            Action::StartBusiness { investment } => {
                self.start_business(investment, now).map(|business| {
                    Outcome::BusinessStarted {
                        target_total: business.target_total,
                        next_drop_at: business.next_drop_at.unwrap_or(now),
                    }
                })
            }
            Action::ClaimBusinessReward => self
                .claim_business_reward(now)
                .map(|reward| Outcome::BusinessRewardClaimed { reward }),
            Action::ResetBusiness => self.reset_business().map(|()| Outcome::BusinessReset),
            Action::SellItems { items } => self
                .sell_items(&items)
                .map(|(count, proceeds)| Outcome::Sold { count, proceeds }),
            Action::SellAll => {
                let (count, proceeds) = self.sell_all();
                Ok(Outcome::Sold { count, proceeds })
            }
        };
        if let Err(e) = &result {
            debug!("action rejected: {}", e);
        }
        result
    }

    /// Reconcile time-driven state with `now`: ticks the crash flight and catches up the
    /// business. Safe to call at any rate, including after a long suspension.
    pub fn reconcile(&mut self, now: u64) -> Vec<BusinessEvent> {
        self.crash_tick(now);
        self.advance_business(now)
    }
}
