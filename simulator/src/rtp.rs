//! Monte Carlo return estimates.
//!
//! Each estimator plays `rounds` independent rounds straight against the engines and reports
//! the catalog value returned per unit wagered. Item wins are valued at catalog price.

use anyhow::{anyhow, bail};
use serde::Serialize;
use stardrop_execution::casino::{
    business, case, crash, sampler::SamplerCache, slot, upgrade,
};
use stardrop_execution::{mint_item, Catalog, GameConfig, GameRng, Randomness};
use stardrop_types::casino::BusinessState;

/// Game mode to estimate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Game {
    Case,
    Crash,
    Upgrade,
    Slot,
    Business,
}

/// Upper bound on drops per simulated business, so a pathological config cannot hang.
const MAX_BUSINESS_DROPS: u32 = 100_000;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Report {
    pub game: String,
    pub rounds: u64,
    pub wagered: u64,
    pub returned: u64,
    pub wins: u64,
    /// `returned / wagered`.
    pub rtp: f64,
    pub win_rate: f64,
}

impl Report {
    fn new(game: &str) -> Self {
        Self {
            game: game.to_string(),
            ..Self::default()
        }
    }

    fn record(&mut self, wagered: u64, returned: u64) {
        self.rounds += 1;
        self.wagered = self.wagered.saturating_add(wagered);
        self.returned = self.returned.saturating_add(returned);
        if returned > 0 {
            self.wins += 1;
        }
    }

    fn finish(mut self) -> Self {
        if self.wagered > 0 {
            self.rtp = self.returned as f64 / self.wagered as f64;
        }
        if self.rounds > 0 {
            self.win_rate = self.wins as f64 / self.rounds as f64;
        }
        self
    }
}

/// Knobs for the estimators. Prices are resolved to the closest catalog item.
#[derive(Clone, Debug)]
pub struct Params {
    pub case: String,
    pub stake_price: u64,
    pub cash_out_at: f64,
    pub upgrade_target_price: u64,
    pub bet: u64,
    pub investment: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            case: "starter".to_string(),
            stake_price: 100,
            cash_out_at: 2.0,
            upgrade_target_price: 400,
            bet: 100,
            investment: 1_000,
        }
    }
}

pub fn estimate(
    game: Game,
    catalog: &Catalog,
    config: &GameConfig,
    params: &Params,
    rounds: u64,
    seed: u64,
) -> anyhow::Result<Report> {
    let mut rng = GameRng::new(seed, game as u64);
    match game {
        Game::Case => cases(catalog, &params.case, rounds, &mut rng),
        Game::Crash => Ok(crashes(
            catalog,
            config,
            params.stake_price,
            params.cash_out_at,
            rounds,
            &mut rng,
        )),
        Game::Upgrade => upgrades(
            catalog,
            config,
            params.stake_price,
            params.upgrade_target_price,
            rounds,
            &mut rng,
        ),
        Game::Slot => slots(catalog, config, params.bet, rounds, &mut rng),
        Game::Business => businesses(catalog, config, params.investment, rounds, &mut rng),
    }
}

pub fn cases<R: Randomness>(
    catalog: &Catalog,
    key: &str,
    rounds: u64,
    rng: &mut R,
) -> anyhow::Result<Report> {
    let case = catalog
        .case(key)
        .ok_or_else(|| anyhow!("unknown case {key}"))?;
    let mut samplers = SamplerCache::new();
    let mut report = Report::new("case");
    for _ in 0..rounds {
        let drops = case::open(catalog, &mut samplers, case, 1, rng, 0)?;
        let returned = drops.iter().map(|item| item.price()).sum();
        report.record(case.price, returned);
    }
    Ok(report.finish())
}

/// Always cash out once the multiplier reaches `cash_out_at`.
pub fn crashes<R: Randomness>(
    catalog: &Catalog,
    config: &GameConfig,
    stake_price: u64,
    cash_out_at: f64,
    rounds: u64,
    rng: &mut R,
) -> Report {
    let stake_item = catalog.closest_by_price(stake_price as f64);
    let request_ms = crash::crash_time_ms(config.crash.growth_rate_per_sec, cash_out_at)
        .ceil()
        .max(0.0) as u64;
    let mut report = Report::new("crash");
    for _ in 0..rounds {
        let stake = mint_item(stake_item, rng, 0);
        let mut round = crash::start(&config.crash, stake, rng, 0);
        let returned = match crash::cash_out(&config.crash, catalog, &mut round, rng, request_ms) {
            Ok(crash::CashOut::CashedOut { winnings, .. }) => winnings.price(),
            _ => 0,
        };
        report.record(stake_item.price, returned);
    }
    report.finish()
}

pub fn upgrades<R: Randomness>(
    catalog: &Catalog,
    config: &GameConfig,
    stake_price: u64,
    target_price: u64,
    rounds: u64,
    rng: &mut R,
) -> anyhow::Result<Report> {
    let stake_item = catalog.closest_by_price(stake_price as f64);
    let target = catalog.closest_by_price(target_price as f64);
    if target.price <= stake_item.price {
        bail!(
            "upgrade target {} is not priced above stake {}",
            target.price,
            stake_item.price
        );
    }
    let mut report = Report::new("upgrade");
    for _ in 0..rounds {
        let stake = mint_item(stake_item, rng, 0);
        let mut round = upgrade::spin(&config.upgrade, stake, target, rng)?;
        upgrade::resolve(&mut round, rng, 0);
        let returned = round.minted.map(|item| item.price()).unwrap_or(0);
        report.record(stake_item.price, returned);
    }
    Ok(report.finish())
}

pub fn slots<R: Randomness>(
    catalog: &Catalog,
    config: &GameConfig,
    bet: u64,
    rounds: u64,
    rng: &mut R,
) -> anyhow::Result<Report> {
    let mut report = Report::new("slot");
    for _ in 0..rounds {
        let (mut round, _) = slot::prepare(&config.slot, catalog, bet, rng)?;
        slot::spin(&mut round, rng);
        slot::finish(&mut round, rng, 0);
        let returned = round.minted.map(|item| item.price()).unwrap_or(0);
        report.record(bet, returned);
    }
    Ok(report.finish())
}

/// Run each business to completion, claiming every reward as soon as it drops.
pub fn businesses<R: Randomness>(
    catalog: &Catalog,
    config: &GameConfig,
    investment: u64,
    rounds: u64,
    rng: &mut R,
) -> anyhow::Result<Report> {
    let tick = config.business.tick_ms;
    let mut report = Report::new("business");
    for _ in 0..rounds {
        let mut state =
            business::start(&config.business, &BusinessState::default(), investment, rng, 0)?;
        let mut now = 0u64;
        let mut drops = 0;
        while state.active {
            if drops >= MAX_BUSINESS_DROPS {
                bail!("business did not complete after {drops} drops");
            }
            now = now.saturating_add(tick);
            business::advance(&config.business, catalog, &mut state, rng, now);
            if state.pending_reward.is_some() {
                business::claim(&config.business, &mut state, now)?;
            }
            drops += 1;
        }
        report.record(investment, state.earned_total);
    }
    Ok(report.finish())
}
