//! Engine configuration.
//!
//! Every engine has a config struct whose `Default` matches the observed deployment constants.
//! All of them deserialize with `#[serde(default)]`, so a JSON file may override any subset.
//! [`GameConfig::validate`] must pass before a [`crate::Layer`] is built: invalid odds are
//! rejected at startup, never discovered mid-round.

use crate::casino::catalog::Catalog;
use serde::Deserialize;
use std::collections::BTreeSet;
use stardrop_types::casino::{
    BUSINESS_TICK_MS, DEFAULT_CRASH_GROWTH_RATE, DEFAULT_CRASH_RTP, DEFAULT_SLOT_BET_MULTIPLES,
    DEFAULT_SLOT_RTP, INITIAL_BALANCE, MAX_CASE_QUANTITY, PRICE_TOLERANCE_HIGH,
    PRICE_TOLERANCE_LOW, SAVE_DEBOUNCE_MS, SLOT_VARIANTS,
};
use thiserror::Error as ThisError;

/// Fatal configuration problem.
#[derive(Debug, ThisError, Clone, PartialEq)]
pub enum ConfigError {
    #[error("catalog has no items")]
    EmptyCatalog,
    #[error("duplicate catalog item id {0}")]
    DuplicateItem(u32),
    #[error("item {item} {field} is {len} bytes, max {max}")]
    FieldTooLong {
        item: u32,
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("duplicate case key {0}")]
    DuplicateCase(String),
    #[error("case {0} has an empty drop table")]
    EmptyDropTable(String),
    #[error("case {case} drops unknown item {item}")]
    UnknownDropItem { case: String, item: u32 },
    #[error("case {case} has a non-positive weight for item {item}")]
    InvalidWeight { case: String, item: u32 },
    #[error("{game} rtp must be in (0, 1], got {rtp}")]
    InvalidRtp { game: &'static str, rtp: f64 },
    #[error("crash growth rate must be positive, got {0}")]
    InvalidGrowthRate(f64),
    #[error("invalid range for {0}")]
    InvalidRange(&'static str),
    #[error("business tick must be greater than zero")]
    ZeroTick,
    #[error("slot bet {bet} solves to win probability {win_probability} > 1")]
    SlotOverfunded { bet: u64, win_probability: f64 },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CrashConfig {
    /// Expected return; crash point = rtp / (1 - r).
    pub rtp: f64,
    /// Growth rate k per second: multiplier(t) = e^(k*t).
    pub growth_rate_per_sec: f64,
}

impl Default for CrashConfig {
    fn default() -> Self {
        Self {
            rtp: DEFAULT_CRASH_RTP,
            growth_rate_per_sec: DEFAULT_CRASH_GROWTH_RATE,
        }
    }
}

impl CrashConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_rtp("crash", self.rtp)?;
        if !self.growth_rate_per_sec.is_finite() || self.growth_rate_per_sec <= 0.0 {
            return Err(ConfigError::InvalidGrowthRate(self.growth_rate_per_sec));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct UpgradeConfig {
    pub min_full_spins: u32,
    pub max_full_spins: u32,
    /// Maximum gap kept between the landing angle and a sector edge.
    pub edge_inset_degrees: f64,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            min_full_spins: 3,
            max_full_spins: 6,
            edge_inset_degrees: 5.0,
        }
    }
}

impl UpgradeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_full_spins > self.max_full_spins {
            return Err(ConfigError::InvalidRange("upgrade full spins"));
        }
        if !self.edge_inset_degrees.is_finite() || self.edge_inset_degrees < 0.0 {
            return Err(ConfigError::InvalidRange("upgrade edge inset"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    pub rtp: f64,
    pub bet_multiples: [f64; SLOT_VARIANTS],
    pub min_bet: u64,
    pub max_bet: u64,
    pub tolerance_low: f64,
    pub tolerance_high: f64,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            rtp: DEFAULT_SLOT_RTP,
            bet_multiples: DEFAULT_SLOT_BET_MULTIPLES,
            min_bet: 1,
            max_bet: 100_000,
            tolerance_low: PRICE_TOLERANCE_LOW,
            tolerance_high: PRICE_TOLERANCE_HIGH,
        }
    }
}

impl SlotConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_rtp("slot", self.rtp)?;
        if self.min_bet == 0 || self.min_bet > self.max_bet {
            return Err(ConfigError::InvalidRange("slot bet"));
        }
        if !(self.tolerance_low > 0.0 && self.tolerance_low <= self.tolerance_high) {
            return Err(ConfigError::InvalidRange("slot price tolerance"));
        }
        if self
            .bet_multiples
            .iter()
            .any(|multiple| !multiple.is_finite() || *multiple <= 0.0)
        {
            return Err(ConfigError::InvalidRange("slot bet multiples"));
        }
        Ok(())
    }

    /// Reject bet ranges where any bet's nominal variant payouts solve to `4p > 1`.
    ///
    /// Uses the closest-priced item at each bet multiple, which is what the resolver falls back
    /// to when a tolerance band is empty. Between two bets where some multiple crosses a price
    /// midpoint the resolved items are fixed and `4p` grows with the bet, so checking the bets
    /// on either side of every crossing (plus both ends of the range) covers the whole range.
    pub fn validate_against(&self, catalog: &Catalog) -> Result<(), ConfigError> {
        let mut worst: Option<(u64, f64)> = None;
        for bet in self.critical_bets(catalog) {
            let win_probability = self.nominal_win_probability(catalog, bet);
            if win_probability > worst.map_or(1.0, |(_, p)| p) {
                worst = Some((bet, win_probability));
            }
        }
        match worst {
            Some((bet, win_probability)) => Err(ConfigError::SlotOverfunded {
                bet,
                win_probability,
            }),
            None => Ok(()),
        }
    }

    /// `4p` for `bet` with every variant resolved to its closest-priced item.
    fn nominal_win_probability(&self, catalog: &Catalog, bet: u64) -> f64 {
        let payouts: u64 = self
            .bet_multiples
            .iter()
            .map(|multiple| catalog.closest_by_price(bet as f64 * multiple).price)
            .sum();
        if payouts == 0 {
            return f64::INFINITY;
        }
        SLOT_VARIANTS as f64 * self.rtp * bet as f64 / payouts as f64
    }

    /// Bets in range at which the closest-priced variant set can change.
    fn critical_bets(&self, catalog: &Catalog) -> BTreeSet<u64> {
        let mut prices: Vec<u64> = catalog.items().iter().map(|item| item.price).collect();
        prices.sort_unstable();
        prices.dedup();

        let range = self.min_bet..=self.max_bet;
        let mut bets = BTreeSet::from([self.min_bet, self.max_bet]);
        for pair in prices.windows(2) {
            let midpoint = (pair[0] as f64 + pair[1] as f64) / 2.0;
            for multiple in &self.bet_multiples {
                let crossing = midpoint / multiple;
                if !crossing.is_finite() || crossing < 0.0 {
                    continue;
                }
                let floor = crossing.floor() as u64;
                let ceil = crossing.ceil() as u64;
                bets.extend(
                    [floor.saturating_sub(1), floor, ceil]
                        .into_iter()
                        .filter(|bet| range.contains(bet)),
                );
            }
        }
        bets
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BusinessConfig {
    pub tick_ms: u64,
    /// Target multiplier is drawn from [min, max).
    pub min_target_multiplier: f64,
    pub max_target_multiplier: f64,
    /// Reward percent is drawn from the inclusive integer range [min, max].
    pub min_reward_percent: u32,
    pub max_reward_percent: u32,
    pub min_investment: u64,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            tick_ms: BUSINESS_TICK_MS,
            min_target_multiplier: 0.8,
            max_target_multiplier: 1.6,
            min_reward_percent: 1,
            max_reward_percent: 20,
            min_investment: 1,
        }
    }
}

impl BusinessConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if !(self.min_target_multiplier > 0.0
            && self.min_target_multiplier < self.max_target_multiplier)
        {
            return Err(ConfigError::InvalidRange("business target multiplier"));
        }
        if self.min_reward_percent == 0 || self.min_reward_percent > self.max_reward_percent {
            return Err(ConfigError::InvalidRange("business reward percent"));
        }
        if self.min_investment == 0 {
            return Err(ConfigError::InvalidRange("business minimum investment"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CaseConfig {
    pub max_quantity: u32,
}

impl Default for CaseConfig {
    fn default() -> Self {
        Self {
            max_quantity: MAX_CASE_QUANTITY,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub debounce_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            debounce_ms: SAVE_DEBOUNCE_MS,
        }
    }
}

/// Deployment configuration for every engine.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub initial_balance: u64,
    pub cases: CaseConfig,
    pub crash: CrashConfig,
    pub upgrade: UpgradeConfig,
    pub slot: SlotConfig,
    pub business: BusinessConfig,
    pub persistence: PersistenceConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_balance: INITIAL_BALANCE,
            cases: CaseConfig::default(),
            crash: CrashConfig::default(),
            upgrade: UpgradeConfig::default(),
            slot: SlotConfig::default(),
            business: BusinessConfig::default(),
            persistence: PersistenceConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn validate(&self, catalog: &Catalog) -> Result<(), ConfigError> {
        if self.cases.max_quantity == 0 {
            return Err(ConfigError::InvalidRange("case quantity"));
        }
        self.crash.validate()?;
        self.upgrade.validate()?;
        self.slot.validate()?;
        self.slot.validate_against(catalog)?;
        self.business.validate()?;
        Ok(())
    }
}

fn validate_rtp(game: &'static str, rtp: f64) -> Result<(), ConfigError> {
    if !rtp.is_finite() || rtp <= 0.0 || rtp > 1.0 {
        return Err(ConfigError::InvalidRtp { game, rtp });
    }
    Ok(())
}
