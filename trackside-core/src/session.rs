//! Session state and the merge engine.
//!
//! Every top-level field of a [`PartialSessionState`] is either
//! [`Reported::Present`] or [`Reported::Absent`]. Merging adopts present
//! fields wholesale and keeps the previous value for absent ones. There is
//! no deep merge inside a field.
//!
//! "Empty" is decided once, by the extractor, when it builds the partial
//! state. A currency block reported with zero values is present; a missing
//! block is absent. The two stay distinct here.

use serde::{Deserialize, Serialize};

use crate::calendar::{self, GameDate};
use crate::live::LiveCatalog;
use crate::types::{
    CharacterStats, GameEvent, GameStats, LiveCommand, LiveItemId, PartnerEvaluation,
    PerformanceCurrencies, TrainingCommand,
};

// ---------------------------------------------------------------------------
// Presence wrapper
// ---------------------------------------------------------------------------

/// A field that a snapshot either reported or did not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "presence", content = "value", rename_all = "snake_case")]
pub enum Reported<T> {
    /// Nothing new to report; keep what you had.
    #[default]
    Absent,
    /// The snapshot's current truth for this field.
    Present(T),
}

impl<T> Reported<T> {
    /// Whether a value was reported.
    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Convert into an `Option`.
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Present(v) => Some(v),
            Self::Absent => None,
        }
    }

    /// Resolve against the previous value.
    pub fn or_keep(self, previous: T) -> T {
        match self {
            Self::Present(v) => v,
            Self::Absent => previous,
        }
    }
}

impl<T> Reported<Vec<T>> {
    /// A list counts as reported only when it has entries.
    #[must_use]
    pub fn non_empty(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Absent
        } else {
            Self::Present(items)
        }
    }
}

impl<T> From<Option<T>> for Reported<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Present)
    }
}

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

/// The canonical, merged view of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Turn and coins.
    pub game_stats: GameStats,
    /// Character stats.
    pub stats: CharacterStats,
    /// Training commands for the current turn.
    pub commands: Vec<TrainingCommand>,
    /// Partner bond gauges.
    pub partners: Vec<PartnerEvaluation>,
    /// Narrative events awaiting display, with resolved outcomes.
    pub events: Vec<GameEvent>,
    /// Performance currencies, once any snapshot has reported them.
    pub currencies: Option<PerformanceCurrencies>,
    /// Per-command currency deltas from the live block.
    pub live_commands: Vec<LiveCommand>,
    /// Live items currently on sale.
    pub offered_items: Vec<LiveItemId>,
    /// Live items already bought.
    pub purchased: Vec<LiveItemId>,
}

impl SessionState {
    /// In-game date, once a turn has been reported.
    #[must_use]
    pub fn date(&self) -> Option<GameDate> {
        calendar::turn_to_date(self.game_stats.turn).ok()
    }

    /// Commands the player can pick this turn.
    pub fn enabled_commands(&self) -> impl Iterator<Item = &TrainingCommand> {
        self.commands.iter().filter(|c| c.enabled)
    }

    /// The calendar-gated live pool minus purchased items. Empty before the
    /// first turn is known.
    #[must_use]
    pub fn available_pool(&self, catalog: &LiveCatalog) -> Vec<LiveItemId> {
        catalog
            .available_pool(self.game_stats.turn, &self.purchased)
            .unwrap_or_default()
    }

    /// The part of `pool` on sale this turn. Until a sale list has been
    /// reported, the whole pool.
    #[must_use]
    pub fn on_sale(&self, pool: &[LiveItemId]) -> Vec<LiveItemId> {
        if self.offered_items.is_empty() {
            return pool.to_vec();
        }
        pool.iter()
            .copied()
            .filter(|id| self.offered_items.contains(id))
            .collect()
    }

    /// What can be bought right now: the available pool narrowed to the
    /// items on sale.
    #[must_use]
    pub fn purchasable(&self, catalog: &LiveCatalog) -> Vec<LiveItemId> {
        self.on_sale(&self.available_pool(catalog))
    }
}

/// What one snapshot reported. Disposable: consumed by [`merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialSessionState {
    /// Turn counter.
    pub turn: Reported<u32>,
    /// Shop coins.
    pub coin_num: Reported<u32>,
    /// Character stats.
    pub stats: Reported<CharacterStats>,
    /// Training commands.
    pub commands: Reported<Vec<TrainingCommand>>,
    /// Partner bond gauges.
    pub partners: Reported<Vec<PartnerEvaluation>>,
    /// Resolved narrative events.
    pub events: Reported<Vec<GameEvent>>,
    /// Performance currencies.
    pub currencies: Reported<PerformanceCurrencies>,
    /// Live command deltas.
    pub live_commands: Reported<Vec<LiveCommand>>,
    /// Items on sale.
    pub offered_items: Reported<Vec<LiveItemId>>,
    /// Purchased items.
    pub purchased: Reported<Vec<LiveItemId>>,
}

impl PartialSessionState {
    /// Whether nothing at all was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields_present() == 0
    }

    /// Number of fields that were reported.
    #[must_use]
    pub fn fields_present(&self) -> usize {
        [
            self.turn.is_present(),
            self.coin_num.is_present(),
            self.stats.is_present(),
            self.commands.is_present(),
            self.partners.is_present(),
            self.events.is_present(),
            self.currencies.is_present(),
            self.live_commands.is_present(),
            self.offered_items.is_present(),
            self.purchased.is_present(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Fold a partial state into the previous one.
///
/// Present fields replace the previous value entirely; absent fields leave
/// it untouched. `merge(s, PartialSessionState::default()) == s`.
#[must_use]
pub fn merge(previous: SessionState, incoming: PartialSessionState) -> SessionState {
    let SessionState {
        game_stats,
        stats,
        commands,
        partners,
        events,
        currencies,
        live_commands,
        offered_items,
        purchased,
    } = previous;

    SessionState {
        game_stats: GameStats {
            turn: incoming.turn.or_keep(game_stats.turn),
            coin_num: incoming.coin_num.or_keep(game_stats.coin_num),
        },
        stats: incoming.stats.or_keep(stats),
        commands: incoming.commands.or_keep(commands),
        partners: incoming.partners.or_keep(partners),
        events: incoming.events.or_keep(events),
        currencies: incoming.currencies.into_option().or(currencies),
        live_commands: incoming.live_commands.or_keep(live_commands),
        offered_items: incoming.offered_items.or_keep(offered_items),
        purchased: incoming.purchased.or_keep(purchased),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gauge, ParamDelta, TargetType};

    fn populated() -> SessionState {
        SessionState {
            game_stats: GameStats { turn: 12, coin_num: 40 },
            stats: CharacterStats {
                vital: Gauge::new(55, 100),
                speed: Gauge::new(300, 1200),
                ..CharacterStats::default()
            },
            commands: vec![TrainingCommand {
                command_id: 101,
                enabled: true,
                params: vec![ParamDelta { target: TargetType::Speed, value: 9 }],
                ..TrainingCommand::default()
            }],
            currencies: Some(PerformanceCurrencies {
                dance: Gauge::new(30, 300),
                ..PerformanceCurrencies::default()
            }),
            purchased: vec![40002],
            ..SessionState::default()
        }
    }

    #[test]
    fn empty_partial_changes_nothing() {
        let state = populated();
        assert_eq!(merge(state.clone(), PartialSessionState::default()), state);
        assert!(PartialSessionState::default().is_empty());
    }

    #[test]
    fn present_field_replaces_wholesale() {
        let state = populated();
        let stats = CharacterStats {
            vital: Gauge::new(10, 100),
            ..CharacterStats::default()
        };
        let merged = merge(
            state.clone(),
            PartialSessionState {
                stats: Reported::Present(stats),
                ..PartialSessionState::default()
            },
        );
        assert_eq!(merged.stats, stats);
        // speed was not carried over from the previous stats
        assert_eq!(merged.stats.speed, Gauge::default());
        assert_eq!(merged.commands, state.commands);
        assert_eq!(merged.game_stats, state.game_stats);
    }

    #[test]
    fn scalars_adopted_independently() {
        let merged = merge(
            populated(),
            PartialSessionState {
                turn: Reported::Present(13),
                ..PartialSessionState::default()
            },
        );
        assert_eq!(merged.game_stats.turn, 13);
        assert_eq!(merged.game_stats.coin_num, 40);
    }

    #[test]
    fn zeroed_currency_block_is_still_adopted() {
        let merged = merge(
            populated(),
            PartialSessionState {
                currencies: Reported::Present(PerformanceCurrencies::default()),
                ..PartialSessionState::default()
            },
        );
        assert_eq!(merged.currencies, Some(PerformanceCurrencies::default()));
    }

    #[test]
    fn non_empty_treats_empty_lists_as_absent() {
        assert_eq!(Reported::<Vec<u32>>::non_empty(vec![]), Reported::Absent);
        assert_eq!(Reported::non_empty(vec![1]), Reported::Present(vec![1]));
        assert_eq!(Reported::from(Some(3)), Reported::Present(3));
        assert_eq!(Reported::<u32>::from(None), Reported::Absent);
    }

    #[test]
    fn fields_present_counts() {
        let partial = PartialSessionState {
            turn: Reported::Present(1),
            purchased: Reported::Present(vec![40000]),
            ..PartialSessionState::default()
        };
        assert_eq!(partial.fields_present(), 2);
        assert!(!partial.is_empty());
    }

    #[test]
    fn session_helpers() {
        let catalog = LiveCatalog::bundled().expect("bundled");
        let state = populated();
        assert_eq!(state.date().map(|d| d.month), Some(6));
        assert_eq!(state.enabled_commands().count(), 1);
        let pool = state.available_pool(&catalog);
        assert!(!pool.contains(&40002));
        assert!(pool.contains(&40001));
        assert!(SessionState::default().available_pool(&catalog).is_empty());
        assert!(SessionState::default().date().is_none());
    }

    #[test]
    fn sale_list_narrows_the_pool() {
        let catalog = LiveCatalog::bundled().expect("bundled");
        let mut state = populated();
        assert_eq!(state.purchasable(&catalog), state.available_pool(&catalog));

        // 40002 is on sale but already bought; 40013 is not in the pool yet
        state.offered_items = vec![40003, 40002, 40013];
        assert_eq!(state.purchasable(&catalog), vec![40003]);
        assert_eq!(state.on_sale(&[40001, 40003]), vec![40003]);
    }
}
