//! Affordability recommender and live planning helpers.
//!
//! `recommend` is a feasibility filter, not an optimiser: each candidate is
//! checked on its own against the budget the reserved items need. It never
//! combines candidates and never ranks the result.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use super::{LiveCatalog, LiveItem};
use crate::types::{
    Discipline, LiveCommand, LiveItemId, PerformanceCurrencies, TargetType, training_target,
};

// ---------------------------------------------------------------------------
// Per-discipline totals
// ---------------------------------------------------------------------------

/// An amount per discipline, indexed by [`Discipline`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostByDiscipline([u32; 5]);

impl CostByDiscipline {
    /// The cost of one item.
    #[must_use]
    pub fn of_item(item: &LiveItem) -> Self {
        let mut total = Self::default();
        total.add_item(item);
        total
    }

    /// Add an item's price.
    pub fn add_item(&mut self, item: &LiveItem) {
        for cost in &item.costs {
            self[cost.discipline] = self[cost.discipline].saturating_add(cost.amount);
        }
    }

    /// Non-zero entries.
    pub fn iter(&self) -> impl Iterator<Item = (Discipline, u32)> + '_ {
        Discipline::ALL
            .into_iter()
            .map(|d| (d, self[d]))
            .filter(|(_, amount)| *amount > 0)
    }

    /// Whether every entry is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|amount| *amount == 0)
    }
}

impl Index<Discipline> for CostByDiscipline {
    type Output = u32;

    fn index(&self, discipline: Discipline) -> &u32 {
        &self.0[discipline.index()]
    }
}

impl IndexMut<Discipline> for CostByDiscipline {
    fn index_mut(&mut self, discipline: Discipline) -> &mut u32 {
        &mut self.0[discipline.index()]
    }
}

/// Total price of the reserved items, per discipline. Ids missing from the
/// catalog contribute nothing.
#[must_use]
pub fn reserved_cost(catalog: &LiveCatalog, reserved: &BTreeSet<LiveItemId>) -> CostByDiscipline {
    let mut total = CostByDiscipline::default();
    for item in reserved.iter().filter_map(|id| catalog.get(*id)) {
        total.add_item(item);
    }
    total
}

/// Whether the currencies cover the item's full price outright.
#[must_use]
pub fn can_afford(item: &LiveItem, currencies: &PerformanceCurrencies) -> bool {
    CostByDiscipline::of_item(item)
        .iter()
        .all(|(d, cost)| currencies.value(d) >= cost)
}

/// Items from `purchasable` that can be bought without endangering any
/// reserved item.
///
/// * Reserved items in `purchasable` are included when affordable outright.
/// * Any other item qualifies when, for every discipline it costs,
///   `currency - cost >= reserved cost`.
///
/// Unknown currencies yield an empty set. Ids missing from the catalog are
/// ignored.
#[must_use]
pub fn recommend(
    catalog: &LiveCatalog,
    reserved: &BTreeSet<LiveItemId>,
    currencies: Option<&PerformanceCurrencies>,
    purchasable: &[LiveItemId],
) -> BTreeSet<LiveItemId> {
    let Some(currencies) = currencies else {
        return BTreeSet::new();
    };
    let baseline = reserved_cost(catalog, reserved);

    purchasable
        .iter()
        .filter_map(|id| catalog.get(*id))
        .filter(|item| {
            if reserved.contains(&item.id) {
                return can_afford(item, currencies);
            }
            CostByDiscipline::of_item(item).iter().all(|(d, cost)| {
                u64::from(currencies.value(d)) >= u64::from(cost) + u64::from(baseline[d])
            })
        })
        .map(|item| item.id)
        .collect()
}

/// The recommended items with the lowest total price. Display helper only;
/// [`recommend`] itself does not rank.
#[must_use]
pub fn cheapest(catalog: &LiveCatalog, recommendation: &BTreeSet<LiveItemId>) -> Vec<LiveItemId> {
    let items: Vec<&LiveItem> = recommendation.iter().filter_map(|id| catalog.get(*id)).collect();
    let Some(min) = items.iter().map(|item| item.total_cost()).min() else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter(|item| item.total_cost() == min)
        .map(|item| item.id)
        .collect()
}

// ---- Planning helpers ----

/// Automatic pre-selection: every unpurchased pool item sharing the highest
/// weight.
#[must_use]
pub fn default_reservations(
    catalog: &LiveCatalog,
    pool: &[LiveItemId],
    purchased: &[LiveItemId],
) -> BTreeSet<LiveItemId> {
    let candidates: Vec<&LiveItem> = pool
        .iter()
        .filter(|id| !purchased.contains(id))
        .filter_map(|id| catalog.get(*id))
        .collect();
    let Some(top) = candidates.iter().map(|item| item.weight).max() else {
        return BTreeSet::new();
    };
    candidates
        .into_iter()
        .filter(|item| item.weight == top)
        .map(|item| item.id)
        .collect()
}

/// Currencies as they would be after choosing a command. Values floor at 0
/// and are not capped at the gauge maximum.
#[must_use]
pub fn preview_currencies(currencies: &PerformanceCurrencies, command: &LiveCommand) -> PerformanceCurrencies {
    let mut preview = *currencies;
    for delta in &command.performance {
        let gauge = preview.get_mut(delta.discipline);
        gauge.value = gauge.value.saturating_add_signed(delta.value);
    }
    preview
}

/// For each discipline, the training stats whose commands raise it, in the
/// order the commands were reported.
#[must_use]
pub fn training_sources(live_commands: &[LiveCommand]) -> BTreeMap<Discipline, Vec<TargetType>> {
    let mut sources: BTreeMap<Discipline, Vec<TargetType>> = BTreeMap::new();
    for command in live_commands {
        let Some(target) = training_target(command.command_id) else {
            continue;
        };
        for delta in command.performance.iter().filter(|d| d.value > 0) {
            let targets = sources.entry(delta.discipline).or_default();
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
    }
    sources
}
