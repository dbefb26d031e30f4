//! Integration tests for full player flows.
//!
//! These drive the [`crate::Layer`] through realistic sequences: buying cases, wagering the drops,
//! suspending and resuming a session, and reloading from storage.

#[cfg(test)]
mod tests {
    use crate::casino::crash::CashOut;
    use crate::casino::upgrade;
    use crate::casino::GameRng;
    use crate::config::{ConfigError, GameConfig, UpgradeConfig};
    use crate::mocks::{sample_case, sample_item, test_catalog, ManualClock, ScriptedRandomness};
    use crate::state::{decode_player, encode_player, load_or_new, Memory, Persister, Store};
    use crate::{Action, Catalog, Clock, GameError, Layer, Outcome};
    use commonware_runtime::deterministic::Runner;
    use commonware_runtime::Runner as _;
    use proptest::prelude::*;
    use stardrop_types::casino::{CrashStatus, Player};

    const TICK: u64 = 60_000;

    fn two_item_catalog() -> Catalog {
        Catalog::new(
            vec![sample_item(1, 40), sample_item(2, 250)],
            vec![sample_case("basic", 100, &[(1, 70.0), (2, 30.0)])],
        )
        .unwrap()
    }

    /// Case priced 100 with a 70/30 table, balance 1000, quantity 5.
    #[test]
    fn test_case_purchase_example() {
        let catalog = two_item_catalog();
        let config = GameConfig::default();
        let mut layer = Layer::new(&catalog, &config, GameRng::new(9, 0), Player::new(1_000));

        let items = layer.open_case("basic", 5, 42).unwrap();
        assert_eq!(items.len(), 5);
        assert!(items.iter().all(|item| [1, 2].contains(&item.item_id())));
        assert_eq!(layer.player().balance(), 500);
        assert_eq!(layer.player().inventory.len(), 5);
        // Most recent first
        assert_eq!(layer.player().inventory[0], items[4]);
    }

    /// rtp 0.95 and r = 0.5 give a 1.9x crash point; a cash-out at 5s pays about 1.35x.
    #[test]
    fn test_crash_example() {
        let catalog = test_catalog();
        let config = GameConfig::default();
        let clock = ManualClock::new(1_000_000);
        let rng = ScriptedRandomness::new(vec![0.1, 0.5]);
        let mut layer = Layer::new(&catalog, &config, rng, Player::new(1_000));
        let stake = layer.open_case("starter", 1, clock.now_ms()).unwrap().remove(0);

        layer.start_crash(&stake.unique_id, clock.now_ms()).unwrap();
        // A throttled caller ticks only once mid-flight; the outcome is unaffected
        clock.advance(2_000);
        assert_eq!(layer.crash_tick(clock.now_ms()), Some(CrashStatus::Flying));
        clock.advance(3_000);

        let result = layer.crash_cash_out(clock.now_ms()).unwrap();
        let CashOut::CashedOut { multiplier, .. } = result else {
            panic!("expected cash out, got {result:?}");
        };
        assert!((multiplier - 1.35).abs() < 0.01);
        assert_eq!(
            layer.crash_round().map(|round| round.status),
            Some(CrashStatus::CashedOut)
        );
    }

    /// Stake 100, target 400: win rate over 10,000 trials lies within [0.23, 0.27].
    #[test]
    fn test_upgrade_example() {
        let config = UpgradeConfig::default();
        let mut rng = GameRng::new(31, 0);
        let stake_item = sample_item(1, 100);
        let target = sample_item(2, 400);
        let trials = 10_000;
        let mut wins = 0;
        for _ in 0..trials {
            let stake = crate::casino::mint_item(&stake_item, &mut rng, 0);
            let round = upgrade::spin(&config, stake, &target, &mut rng).unwrap();
            assert!(round.win_probability > 0.0 && round.win_probability <= 1.0);
            if round.won {
                wins += 1;
            }
        }
        let rate = wins as f64 / trials as f64;
        assert!((0.23..=0.27).contains(&rate), "win rate {rate}");
    }

    #[test]
    fn test_session_suspend_resume_and_reload() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let catalog = test_catalog();
            let config = GameConfig::default();
            let clock = ManualClock::new(0);
            let mut persister = Persister::new(Memory::default(), "alice", 500);

            // First session: invest and get one reward
            let player = load_or_new(persister.store(), "alice", config.initial_balance)
                .await
                .unwrap();
            let mut layer = Layer::new(&catalog, &config, GameRng::new(5, 1), player);
            layer
                .apply(Action::StartBusiness { investment: 500 }, clock.now_ms())
                .unwrap();
            if layer.take_dirty() {
                persister.mark_dirty(clock.now_ms());
            }
            clock.advance(500);
            assert!(persister.flush(layer.player(), clock.now_ms()).await);

            clock.advance(TICK);
            assert!(!layer.reconcile(clock.now_ms()).is_empty());
            layer.claim_business_reward(clock.now_ms()).unwrap();
            assert!(layer.take_dirty());
            persister.mark_dirty(clock.now_ms());
            persister.flush_now(layer.player(), clock.now_ms()).await.unwrap();
            let saved = layer.into_player();

            // Suspended for a day, then reloaded
            clock.advance(24 * 60 * TICK);
            let player = load_or_new(persister.store(), "alice", config.initial_balance)
                .await
                .unwrap();
            assert_eq!(player, saved);
            let mut layer = Layer::new(&catalog, &config, GameRng::new(5, 2), player);
            let events = layer.reconcile(clock.now_ms());
            assert!(!events.is_empty());
            // One catch-up reward for a day offline
            assert_eq!(layer.player().business.rewards_count, 2);
            assert!(layer.reconcile(clock.now_ms()).is_empty());
            assert!(layer.player().validate_invariants().is_ok());
        });
    }

    #[test]
    fn test_player_survives_encoding() {
        let catalog = test_catalog();
        let config = GameConfig::default();
        let mut layer = Layer::new(&catalog, &config, GameRng::new(6, 6), Player::new(5_000));
        layer.open_case("premium", 3, 10).unwrap();
        layer.start_business(100, 10).unwrap();
        let player = layer.into_player();

        let decoded = decode_player(&encode_player(&player)).unwrap();
        assert_eq!(decoded, player);
    }

    #[test]
    fn test_catalog_names_survive_storage() {
        let mut long = sample_item(1, 40);
        long.name = "Легендарный золотой нож с гравировкой".to_string();
        assert!(matches!(
            Catalog::new(vec![long], vec![]),
            Err(ConfigError::FieldTooLong { item: 1, .. })
        ));

        let executor = Runner::default();
        executor.start(|_| async move {
            // Widest accepted name: 32 two-byte characters
            let mut widest = sample_item(1, 40);
            widest.name = "ж".repeat(32);
            let catalog = Catalog::new(
                vec![widest, sample_item(2, 250)],
                vec![sample_case("basic", 100, &[(1, 70.0), (2, 30.0)])],
            )
            .unwrap();
            let config = GameConfig::default();
            let mut layer =
                Layer::new(&catalog, &config, GameRng::new(3, 0), Player::new(123_756));
            layer.open_case("basic", 3, 0).unwrap();
            let player = layer.into_player();
            assert_eq!(player.balance(), 123_456);

            let mut persister = Persister::new(Memory::default(), "dana", 500);
            persister.mark_dirty(0);
            persister.flush_now(&player, 0).await.unwrap();
            let reloaded = load_or_new(persister.store(), "dana", config.initial_balance)
                .await
                .unwrap();
            assert_eq!(reloaded, player);
        });
    }

    #[test]
    fn test_rejected_actions_leave_player_untouched() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let catalog = test_catalog();
            let config = GameConfig::default();
            let mut store = Memory::default();
            store.save("bob", &Player::new(50)).await.unwrap();
            let player = load_or_new(&store, "bob", 1_000).await.unwrap();
            let before = player.clone();
            let mut layer = Layer::new(&catalog, &config, GameRng::new(1, 2), player);

            let rejected = [
                Action::OpenCase {
                    case: "starter".to_string(),
                    quantity: 1,
                },
                Action::CrashCashOut,
                Action::SlotSpin { bet: 60 },
                Action::StartBusiness { investment: 51 },
                Action::ClaimBusinessReward,
                Action::SellItems {
                    items: vec![uuid::Uuid::nil()],
                },
            ];
            for action in rejected {
                assert!(layer.apply(action, 0).is_err());
            }
            assert_eq!(layer.player(), &before);
            assert!(!layer.take_dirty());
            assert!(matches!(
                layer.apply(Action::ResetBusiness, 0),
                Ok(Outcome::BusinessReset)
            ));
        });
    }

    #[test]
    fn test_business_completes_through_layer() {
        let catalog = test_catalog();
        let config = GameConfig::default();
        let mut layer = Layer::new(&catalog, &config, GameRng::new(12, 0), Player::new(1_000));
        layer.start_business(200, 0).unwrap();

        let mut now = 0;
        while layer.player().business.active {
            now += TICK;
            layer.reconcile(now);
            if layer.player().business.pending_reward.is_some() {
                layer.claim_business_reward(now).unwrap();
            }
        }
        let business = layer.player().business.clone();
        assert!(business.earned_total > business.target_total);
        assert_eq!(business.completed_at, Some(now));

        // No further rewards until a new business starts
        let inventory = layer.player().inventory.len();
        assert!(layer.reconcile(now + 100 * TICK).is_empty());
        assert_eq!(layer.player().inventory.len(), inventory);
        assert_eq!(
            layer.claim_business_reward(now),
            Err(GameError::NoPendingReward)
        );
        layer.reset_business().unwrap();
        layer.start_business(100, now).unwrap();
    }

    proptest! {
        #[test]
        fn prop_case_opening_conserves_value(
            balance in 0u64..3_000,
            quantity in 1u32..=10,
            seed in any::<u64>(),
        ) {
            let catalog = test_catalog();
            let config = GameConfig::default();
            let mut layer = Layer::new(&catalog, &config, GameRng::new(seed, 0), Player::new(balance));
            let cost = 100 * quantity as u64;
            match layer.open_case("starter", quantity, 0) {
                Ok(items) => {
                    prop_assert!(balance >= cost);
                    prop_assert_eq!(items.len(), quantity as usize);
                    prop_assert_eq!(layer.player().balance(), balance - cost);
                    prop_assert_eq!(layer.player().inventory.len(), quantity as usize);
                }
                Err(e) => {
                    prop_assert!(balance < cost);
                    prop_assert_eq!(e, GameError::InsufficientFunds { have: balance, need: cost });
                    prop_assert_eq!(layer.player(), &Player::new(balance));
                }
            }
        }
    }
}
