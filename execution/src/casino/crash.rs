//! Crash game.
//!
//! A round starts by drawing `r` in [0, 1) and fixing `crash_point = max(1, rtp / (1 - r))`.
//! The multiplier then grows as `e^(k*t)` with `t` the wall-clock seconds since `started_at`.
//!
//! The multiplier is never accumulated: every [`tick`] and [`cash_out`] re-derives it from
//! elapsed time, so a throttled or suspended caller cannot change the economic outcome.
//!
//! State machine:
//! `Flying -> Crashed` once `multiplier >= crash_point`
//! `Flying -> CashedOut` on a cash-out requested strictly before that

use super::catalog::Catalog;
use super::{mint_item, GameError, Randomness};
use crate::config::CrashConfig;
use stardrop_types::casino::{CrashRoundState, CrashStatus, InventoryItem};

/// Crash point for a uniform draw `unit` in [0, 1).
pub fn crash_point(rtp: f64, unit: f64) -> f64 {
    let tail = 1.0 - unit;
    if tail <= 0.0 {
        return f64::INFINITY;
    }
    (rtp / tail).max(1.0)
}

/// Multiplier after `elapsed_ms` of flight.
pub fn multiplier_at(growth_rate_per_sec: f64, elapsed_ms: u64) -> f64 {
    (growth_rate_per_sec * elapsed_ms as f64 / 1_000.0).exp()
}

/// Milliseconds of flight until the multiplier reaches `crash_point`.
pub fn crash_time_ms(growth_rate_per_sec: f64, crash_point: f64) -> f64 {
    crash_point.ln() / growth_rate_per_sec * 1_000.0
}

/// Result of a cash-out request.
#[derive(Clone, Debug, PartialEq)]
pub enum CashOut {
    /// The threshold was already reached; the stake is lost.
    Crashed { crash_point: f64 },
    /// Honored at the frozen `multiplier`.
    CashedOut {
        multiplier: f64,
        value: f64,
        winnings: InventoryItem,
    },
}

/// Start a flight with `stake` at risk.
pub fn start<R: Randomness>(
    config: &CrashConfig,
    stake: InventoryItem,
    rng: &mut R,
    now: u64,
) -> CrashRoundState {
    CrashRoundState {
        status: CrashStatus::Flying,
        stake,
        crash_point: crash_point(config.rtp, rng.next_unit()),
        started_at: now,
        current_multiplier: 1.0,
        winnings: None,
    }
}

fn elapsed(round: &CrashRoundState, now: u64) -> u64 {
    // Clock skew clamps to zero elapsed time
    now.saturating_sub(round.started_at)
}

/// Advance a flying round to `now`, crashing it if the threshold has been reached.
///
/// Returns the status after the update. Resolved rounds are left untouched.
pub fn tick(config: &CrashConfig, round: &mut CrashRoundState, now: u64) -> CrashStatus {
    if !round.is_flying() {
        return round.status;
    }
    let multiplier = multiplier_at(config.growth_rate_per_sec, elapsed(round, now));
    if multiplier >= round.crash_point {
        round.current_multiplier = round.crash_point;
        round.status = CrashStatus::Crashed;
    } else {
        round.current_multiplier = multiplier;
    }
    round.status
}

/// Resolve a cash-out requested at `now`.
///
/// If the threshold is reached at the same evaluation, the crash wins.
pub fn cash_out<R: Randomness>(
    config: &CrashConfig,
    catalog: &Catalog,
    round: &mut CrashRoundState,
    rng: &mut R,
    now: u64,
) -> Result<CashOut, GameError> {
    if tick(config, round, now) != CrashStatus::Flying {
        if round.status == CrashStatus::Crashed {
            return Ok(CashOut::Crashed {
                crash_point: round.crash_point,
            });
        }
        return Err(GameError::NotFlying);
    }

    let multiplier = round.current_multiplier;
    let value = round.stake.price() as f64 * multiplier;
    let winnings = mint_item(catalog.closest_by_price(value), rng, now);
    round.status = CrashStatus::CashedOut;
    round.winnings = Some(winnings.clone());
    Ok(CashOut::CashedOut {
        multiplier,
        value,
        winnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::casino::GameRng;
    use crate::mocks::{sample_item, test_catalog, ScriptedRandomness};
    use proptest::prelude::*;

    fn stake(price: u64) -> InventoryItem {
        mint_item(&sample_item(4, price), &mut GameRng::new(0, 0), 0)
    }

    fn config(rtp: f64) -> CrashConfig {
        CrashConfig {
            rtp,
            ..CrashConfig::default()
        }
    }

    #[test]
    fn test_crash_point_formula() {
        assert!((crash_point(0.95, 0.5) - 1.9).abs() < 1e-12);
        assert_eq!(crash_point(0.95, 0.0), 1.0);
        assert_eq!(crash_point(0.95, 0.01), 1.0);
        assert!((crash_point(1.0, 0.75) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_cash_out_before_crash() {
        let config = config(0.95);
        let catalog = test_catalog();
        let mut rng = ScriptedRandomness::new(vec![0.5]);
        let mut round = start(&config, stake(100), &mut rng, 10_000);
        assert!((round.crash_point - 1.9).abs() < 1e-12);

        let crash_at = crash_time_ms(config.growth_rate_per_sec, round.crash_point);
        assert!((crash_at - 10_697.6).abs() < 1.0, "crash at {crash_at}");

        let result = cash_out(&config, &catalog, &mut round, &mut rng, 15_000).unwrap();
        let CashOut::CashedOut {
            multiplier,
            value,
            winnings,
        } = result
        else {
            panic!("expected cash out, got {result:?}");
        };
        assert!((multiplier - 0.3f64.exp()).abs() < 1e-9);
        assert!((value - 134.98).abs() < 0.01);
        // Closest to ~135 in the ladder is 150
        assert_eq!(winnings.price(), 150);
        assert_eq!(winnings.obtained_at, 15_000);
        assert_eq!(round.status, CrashStatus::CashedOut);
        assert_eq!(round.winnings, Some(winnings));
    }

    #[test]
    fn test_tick_crashes_at_threshold() {
        let config = config(0.95);
        let mut rng = ScriptedRandomness::new(vec![0.5]);
        let mut round = start(&config, stake(100), &mut rng, 0);

        assert_eq!(tick(&config, &mut round, 10_000), CrashStatus::Flying);
        assert!(round.current_multiplier < 1.9);
        assert_eq!(tick(&config, &mut round, 10_800), CrashStatus::Crashed);
        assert_eq!(round.current_multiplier, round.crash_point);

        // Resolved rounds stay resolved
        assert_eq!(tick(&config, &mut round, 20_000), CrashStatus::Crashed);
    }

    #[test]
    fn test_crash_takes_priority_over_cash_out() {
        let config = config(0.95);
        let catalog = test_catalog();
        let mut rng = ScriptedRandomness::new(vec![0.5]);
        let mut round = start(&config, stake(100), &mut rng, 0);

        // The caller never ticked; the late request still loses
        let result = cash_out(&config, &catalog, &mut round, &mut rng, 60_000).unwrap();
        assert!(matches!(result, CashOut::Crashed { .. }));
        assert_eq!(round.status, CrashStatus::Crashed);
        assert!(round.winnings.is_none());
    }

    #[test]
    fn test_minimum_crash_point_crashes_immediately() {
        let config = config(0.95);
        let catalog = test_catalog();
        let mut rng = ScriptedRandomness::new(vec![0.0]);
        let mut round = start(&config, stake(100), &mut rng, 500);
        assert_eq!(round.crash_point, 1.0);
        let result = cash_out(&config, &catalog, &mut round, &mut rng, 500).unwrap();
        assert!(matches!(result, CashOut::Crashed { .. }));
    }

    #[test]
    fn test_cash_out_after_resolution_is_rejected() {
        let config = config(0.95);
        let catalog = test_catalog();
        let mut rng = ScriptedRandomness::new(vec![0.5]);
        let mut round = start(&config, stake(100), &mut rng, 0);
        cash_out(&config, &catalog, &mut round, &mut rng, 1_000).unwrap();
        assert_eq!(
            cash_out(&config, &catalog, &mut round, &mut rng, 2_000),
            Err(GameError::NotFlying)
        );
    }

    #[test]
    fn test_clock_skew_clamps_to_zero() {
        let config = config(0.95);
        let mut rng = ScriptedRandomness::new(vec![0.5]);
        let mut round = start(&config, stake(100), &mut rng, 5_000);
        assert_eq!(tick(&config, &mut round, 1_000), CrashStatus::Flying);
        assert_eq!(round.current_multiplier, 1.0);
    }

    #[test]
    fn test_fixed_target_cash_out_returns_rtp() {
        // Always cashing out at 2x pays 2 with probability rtp / 2
        let rtp = 0.95;
        let mut rng = GameRng::new(2024, 0);
        let trials = 200_000;
        let payout: f64 = (0..trials)
            .map(|_| {
                if crash_point(rtp, rng.next_unit()) > 2.0 {
                    2.0
                } else {
                    0.0
                }
            })
            .sum();
        let observed = payout / trials as f64;
        assert!((observed - rtp).abs() < 0.02, "observed rtp {observed}");
    }

    proptest! {
        #[test]
        fn prop_multiplier_strictly_increasing(a in 0u64..1_000_000, delta in 1u64..1_000_000) {
            let k = CrashConfig::default().growth_rate_per_sec;
            prop_assert!(multiplier_at(k, a + delta) > multiplier_at(k, a));
        }

        #[test]
        fn prop_cash_out_iff_before_threshold(unit in 0.0f64..0.999, request_ms in 0u64..200_000) {
            let config = CrashConfig::default();
            let catalog = test_catalog();
            let mut rng = ScriptedRandomness::new(vec![unit]);
            let mut round = start(&config, stake(100), &mut rng, 0);
            let reached = multiplier_at(config.growth_rate_per_sec, request_ms) >= round.crash_point;
            let result = cash_out(&config, &catalog, &mut round, &mut rng, request_ms).unwrap();
            match result {
                CashOut::CashedOut { .. } => prop_assert!(!reached),
                CashOut::Crashed { .. } => prop_assert!(reached),
            }
        }
    }
}
