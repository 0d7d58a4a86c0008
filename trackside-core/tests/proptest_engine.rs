//! Property-Based Tests for the trackside engine.
//!
//! Calendar parity, merge identity and replacement, and recommender
//! monotonicity under random inputs.

use std::collections::BTreeSet;

use proptest::prelude::*;

use trackside_core::live::LiveCatalog;
use trackside_core::session::{PartialSessionState, Reported, SessionState, merge};
use trackside_core::{
    CharacterStats, GameStats, Gauge, Half, LiveItemId, PerformanceCurrencies, TrainingCommand,
    recommend, turn_to_date,
};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_gauge() -> impl Strategy<Value = Gauge> {
    (0..2000u32, 0..2000u32).prop_map(|(value, max)| Gauge::new(value, max))
}

fn arb_stats() -> impl Strategy<Value = CharacterStats> {
    (
        arb_gauge(),
        arb_gauge(),
        arb_gauge(),
        arb_gauge(),
        arb_gauge(),
        arb_gauge(),
        0..5000u32,
    )
        .prop_map(|(speed, stamina, power, wiz, guts, vital, skill_point)| CharacterStats {
            speed,
            stamina,
            power,
            wiz,
            guts,
            vital,
            skill_point,
        })
}

fn arb_currencies() -> impl Strategy<Value = PerformanceCurrencies> {
    (0..200u32, 0..200u32, 0..200u32, 0..200u32, 0..200u32).prop_map(|(da, pa, vo, vi, me)| {
        PerformanceCurrencies {
            dance: Gauge::new(da, 300),
            passion: Gauge::new(pa, 300),
            vocal: Gauge::new(vo, 300),
            visual: Gauge::new(vi, 300),
            mental: Gauge::new(me, 300),
        }
    })
}

fn arb_state() -> impl Strategy<Value = SessionState> {
    (
        1..80u32,
        0..500u32,
        arb_stats(),
        prop::collection::vec(100..110u32, 0..5),
        prop::option::of(arb_currencies()),
        prop::collection::vec(40000..40021u32, 0..4),
    )
        .prop_map(|(turn, coin_num, stats, command_ids, currencies, purchased)| SessionState {
            game_stats: GameStats { turn, coin_num },
            stats,
            commands: command_ids
                .into_iter()
                .map(|command_id| TrainingCommand {
                    command_id,
                    enabled: command_id % 2 == 1,
                    ..TrainingCommand::default()
                })
                .collect(),
            currencies,
            purchased,
            ..SessionState::default()
        })
}

fn catalog() -> LiveCatalog {
    LiveCatalog::bundled().expect("bundled live catalog")
}

// ---------------------------------------------------------------------------
// Property: calendar
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn half_follows_turn_parity(turn in 1..10_000u32) {
        let date = turn_to_date(turn).expect("turn >= 1");
        let expected = if turn % 2 == 1 { Half::Upper } else { Half::Lower };
        prop_assert_eq!(date.half, expected);
        prop_assert!((1..=12).contains(&date.month));
        prop_assert!(date.year >= 1);
    }

    #[test]
    fn consecutive_turn_pairs_share_a_month(month_index in 0..5_000u32) {
        let upper = turn_to_date(month_index * 2 + 1).expect("valid");
        let lower = turn_to_date(month_index * 2 + 2).expect("valid");
        prop_assert_eq!((upper.year, upper.month), (lower.year, lower.month));
        prop_assert_eq!(upper.year, month_index / 12 + 1);
    }
}

// ---------------------------------------------------------------------------
// Property: merge
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn merging_nothing_is_identity(state in arb_state()) {
        prop_assert_eq!(merge(state.clone(), PartialSessionState::default()), state);
    }

    #[test]
    fn reported_stats_replace_only_stats(state in arb_state(), stats in arb_stats()) {
        let merged = merge(
            state.clone(),
            PartialSessionState { stats: Reported::Present(stats), ..PartialSessionState::default() },
        );
        prop_assert_eq!(merged.stats, stats);
        let expected = SessionState { stats, ..state };
        prop_assert_eq!(merged, expected);
    }

    #[test]
    fn reported_currencies_replace_even_when_zero(state in arb_state()) {
        let merged = merge(
            state,
            PartialSessionState {
                currencies: Reported::Present(PerformanceCurrencies::default()),
                ..PartialSessionState::default()
            },
        );
        prop_assert_eq!(merged.currencies, Some(PerformanceCurrencies::default()));
    }
}

// ---------------------------------------------------------------------------
// Property: recommender
// ---------------------------------------------------------------------------

fn non_reserved(picks: &BTreeSet<LiveItemId>, reserved: &BTreeSet<LiveItemId>) -> BTreeSet<LiveItemId> {
    picks.difference(reserved).copied().collect()
}

proptest! {
    #[test]
    fn unknown_currencies_never_recommend(
        reserved in prop::collection::btree_set(40000..40021u32, 0..4),
        turn in 1..80u32,
    ) {
        let catalog = catalog();
        let pool = catalog.pool_for_turn(turn).expect("valid");
        prop_assert!(recommend(&catalog, &reserved, None, &pool).is_empty());
    }

    #[test]
    fn adding_a_reservation_never_grows_candidates(
        reserved in prop::collection::btree_set(40000..40021u32, 0..3),
        extra in 40000..40021u32,
        currencies in arb_currencies(),
    ) {
        let catalog = catalog();
        let pool = catalog.pool_for_turn(60).expect("valid");

        let mut more = reserved.clone();
        more.insert(extra);

        let before = non_reserved(&recommend(&catalog, &reserved, Some(&currencies), &pool), &more);
        let after = non_reserved(&recommend(&catalog, &more, Some(&currencies), &pool), &more);
        prop_assert!(after.is_subset(&before));
    }

    #[test]
    fn recommendations_come_from_the_pool(
        reserved in prop::collection::btree_set(40000..40021u32, 0..3),
        currencies in arb_currencies(),
        turn in 1..80u32,
    ) {
        let catalog = catalog();
        let pool = catalog.pool_for_turn(turn).expect("valid");
        let picks = recommend(&catalog, &reserved, Some(&currencies), &pool);
        prop_assert!(picks.iter().all(|id| pool.contains(id)));
    }
}
