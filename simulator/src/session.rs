//! Live session driver.
//!
//! Runs one player against the wall clock: a fast frame loop advances the crash flight and cashes
//! out at a target multiplier, a slower business timer reconciles passive income, and a flush
//! timer persists the player through the debounced [`Persister`]. Every loop re-derives state
//! from `now`, so a stalled timer (or a suspended process) only delays, never changes, outcomes.

use anyhow::Context;
use serde::Serialize;
use stardrop_execution::casino::business::time_until_drop;
use stardrop_execution::{
    load_or_new, BusinessEvent, CashOut, Catalog, Clock, GameConfig, GameError, GameRng, Layer,
    Persister, Store, SystemClock,
};
use stardrop_types::casino::{CrashStatus, Player, Stats};
use std::time::Duration;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, info, warn};

#[derive(Clone, Debug)]
pub struct Options {
    pub player_id: String,
    pub duration: Duration,
    /// Crash multiplier at which to cash out.
    pub cash_out_at: f64,
    /// Case opened whenever there is nothing to stake.
    pub case: String,
    /// Investment made whenever no business is running.
    pub investment: u64,
    /// Slot bet placed on every business tick (0 disables the slot).
    pub slot_bet: u64,
    pub frame: Duration,
    pub seed: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            player_id: "local".to_string(),
            duration: Duration::from_secs(30),
            cash_out_at: 1.5,
            case: "starter".to_string(),
            investment: 200,
            slot_bet: 10,
            frame: Duration::from_millis(50),
            seed: 0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Summary {
    pub balance: u64,
    pub inventory_items: usize,
    pub inventory_value: u64,
    pub stats: Stats,
    pub crash_rounds: u64,
    pub cash_outs: u64,
    pub business_rewards: u64,
    pub slot_spins: u64,
    /// Milliseconds until the next business drop, if one is scheduled.
    pub next_business_drop_ms: Option<u64>,
    /// Catalog ids along the most recent case opening strip.
    pub last_case_strip: Vec<u32>,
    /// Catalog ids along each reel of the most recent slot spin.
    pub last_reels: Vec<Vec<u32>>,
}

impl Summary {
    fn snapshot(&mut self, player: &Player, now: u64) {
        self.next_business_drop_ms = time_until_drop(&player.business, now);
        self.balance = player.balance();
        self.inventory_items = player.inventory.len();
        self.inventory_value = player.inventory_value();
        self.stats = player.stats.clone();
    }
}

/// Auto-player that keeps a crash round and a business running.
struct Driver<'a> {
    layer: Layer<'a, GameRng>,
    options: &'a Options,
    summary: Summary,
}

impl Driver<'_> {
    /// Start a crash round with the newest item, opening a case first if the inventory is empty.
    fn launch(&mut self, now: u64) {
        if self
            .layer
            .crash_round()
            .is_some_and(|round| round.is_flying())
        {
            return;
        }
        if self.layer.player().inventory.is_empty() {
            match self.layer.open_case(&self.options.case, 1, now) {
                Ok(items) => {
                    for item in &items {
                        if let Ok(strip) = self.layer.case_strip(&self.options.case, &item.item) {
                            self.summary.last_case_strip =
                                strip.iter().map(|item| item.id).collect();
                        }
                    }
                }
                Err(e) => {
                    debug!("cannot open case: {}", e);
                    return;
                }
            }
        }
        let Some(stake) = self.layer.player().inventory.first().map(|item| item.unique_id) else {
            return;
        };
        match self.layer.start_crash(&stake, now) {
            Ok(_) => self.summary.crash_rounds += 1,
            Err(e) => debug!("cannot start crash: {}", e),
        }
    }

    /// One frame of the crash flight.
    fn frame(&mut self, now: u64) {
        match self.layer.crash_tick(now) {
            Some(CrashStatus::Flying) => {
                let reached = self
                    .layer
                    .crash_round()
                    .is_some_and(|round| round.current_multiplier >= self.options.cash_out_at);
                if reached {
                    match self.layer.crash_cash_out(now) {
                        Ok(CashOut::CashedOut { .. }) => self.summary.cash_outs += 1,
                        Ok(CashOut::Crashed { .. }) => {}
                        Err(e) => warn!("cash out rejected: {}", e),
                    }
                }
            }
            _ => self.launch(now),
        }
    }

    /// Spin the slot once, if enabled and affordable.
    fn slot(&mut self, now: u64) {
        if self.options.slot_bet == 0 {
            return;
        }
        match self.layer.slot_spin(self.options.slot_bet, now) {
            Ok(round) => {
                self.summary.slot_spins += 1;
                self.summary.last_reels = self
                    .layer
                    .slot_reel_strips(&round)
                    .iter()
                    .map(|reel| reel.iter().map(|item| item.id).collect())
                    .collect();
            }
            Err(e) => debug!("cannot spin slot: {}", e),
        }
    }

    /// Reconcile the business and claim whatever dropped.
    fn business(&mut self, now: u64) {
        if !self.layer.player().business.active {
            if self.layer.player().business.is_completed() {
                if let Err(e) = self.layer.reset_business() {
                    debug!("cannot reset business: {}", e);
                }
            }
            match self.layer.start_business(self.options.investment, now) {
                Ok(_) | Err(GameError::BusinessActive) => {}
                Err(e) => debug!("cannot start business: {}", e),
            }
            return;
        }
        for event in self.layer.advance_business(now) {
            if let BusinessEvent::RewardDropped(_) = event {
                self.summary.business_rewards += 1;
            }
        }
        if self.layer.player().business.pending_reward.is_some() {
            if let Err(e) = self.layer.claim_business_reward(now) {
                warn!("claim rejected: {}", e);
            }
        }
    }
}

/// Run a session until `options.duration` elapses or ctrl-c, then flush and summarize.
pub async fn run<S: Store>(
    catalog: &Catalog,
    config: &GameConfig,
    store: S,
    options: &Options,
) -> anyhow::Result<Summary> {
    let clock = SystemClock;
    // An unreadable record aborts the session rather than being overwritten by a fresh account
    let player = load_or_new(&store, &options.player_id, config.initial_balance)
        .await
        .with_context(|| format!("failed to load player {}", options.player_id))?;
    info!(
        player_id = %options.player_id,
        balance = player.balance(),
        items = player.inventory.len(),
        "session started"
    );
    let mut persister = Persister::new(store, options.player_id.clone(), config.persistence.debounce_ms);
    let mut driver = Driver {
        layer: Layer::new(
            catalog,
            config,
            GameRng::new(options.seed, clock.now_ms()),
            player,
        ),
        options,
        summary: Summary::default(),
    };

    // Catch up anything owed since the last session before the timers start
    let now = clock.now_ms();
    driver.business(now);
    driver.launch(now);

    let mut frames = interval(options.frame);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut business = interval(Duration::from_millis(config.business.tick_ms.clamp(1, 1_000)));
    business.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut flushes = interval(Duration::from_millis(config.persistence.debounce_ms.max(1)));
    flushes.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let deadline = sleep(options.duration);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            _ = frames.tick() => driver.frame(clock.now_ms()),
            _ = business.tick() => {
                let now = clock.now_ms();
                driver.business(now);
                driver.slot(now);
            }
            _ = flushes.tick() => {
                let now = clock.now_ms();
                if driver.layer.take_dirty() {
                    persister.mark_dirty(now);
                }
                persister.flush(driver.layer.player(), now).await;
            }
        }
    }

    // Teardown: timers are dropped with the loop; persist whatever is outstanding
    let now = clock.now_ms();
    if driver.layer.take_dirty() {
        persister.mark_dirty(now);
    }
    if let Err(e) = persister.flush_now(driver.layer.player(), now).await {
        warn!("final save failed: {:?}", e);
    }

    let mut summary = driver.summary;
    summary.snapshot(driver.layer.player(), clock.now_ms());
    info!(
        balance = summary.balance,
        crash_rounds = summary.crash_rounds,
        cash_outs = summary.cash_outs,
        business_rewards = summary.business_rewards,
        "session finished"
    );
    Ok(summary)
}
