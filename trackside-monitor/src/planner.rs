//! Live-item reservations and the recommendation shown next to them.
//!
//! The planner holds what the user toggled. It follows the published session:
//! purchased items drop out of the reservations, and whenever the pool
//! changes the heaviest items are added (unless auto-reserve is off).
//! Hovering a command previews the currencies it would leave behind. Only
//! items on sale this turn are ever recommended.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;
use trackside_core::config::PlannerConfig;
use trackside_core::live::LiveCatalog;
use trackside_core::live::recommend::{
    self, CostByDiscipline, cheapest, default_reservations, preview_currencies, reserved_cost,
    training_sources,
};
use trackside_core::{Discipline, LiveItemId, PerformanceCurrencies, SessionState, TargetType};

/// User reservations plus the pool they were made against.
#[derive(Debug, Clone, Default)]
pub struct LivePlanner {
    reserved: BTreeSet<LiveItemId>,
    pool: Vec<LiveItemId>,
    hovered: Option<u32>,
    auto_reserve: bool,
}

/// Everything the live panel needs, in one serializable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LivePlan {
    /// Available items (calendar-gated, unpurchased).
    pub pool: Vec<LiveItemId>,
    /// The part of the pool on sale this turn.
    pub on_sale: Vec<LiveItemId>,
    /// Items not available yet.
    pub future: Vec<LiveItemId>,
    /// Reserved items.
    pub reserved: BTreeSet<LiveItemId>,
    /// What the reserved items cost together.
    pub reserved_cost: CostByDiscipline,
    /// Currencies used for the recommendation (previewed when hovering).
    pub currencies: Option<PerformanceCurrencies>,
    /// Items that fit next to the reservations.
    pub recommended: BTreeSet<LiveItemId>,
    /// The cheapest recommended items.
    pub cheapest: Vec<LiveItemId>,
    /// Which trainings feed each currency this turn.
    pub sources: BTreeMap<Discipline, Vec<TargetType>>,
}

impl LivePlanner {
    /// An empty planner.
    #[must_use]
    pub fn new(auto_reserve: bool) -> Self {
        Self {
            auto_reserve,
            ..Self::default()
        }
    }

    /// A planner configured from `[planner]`.
    #[must_use]
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(config.auto_reserve_top_weight)
    }

    /// Follow a newly published session.
    pub fn sync(&mut self, catalog: &LiveCatalog, session: &SessionState) {
        for id in &session.purchased {
            if self.reserved.remove(id) {
                debug!(item = id, "reserved item purchased");
            }
        }

        let pool = session.available_pool(catalog);
        if pool == self.pool {
            return;
        }
        if self.auto_reserve && !pool.is_empty() {
            let top = default_reservations(catalog, &pool, &session.purchased);
            debug!(items = ?top, "auto-reserving top-weight items");
            self.reserved.extend(top);
        }
        self.pool = pool;
    }

    /// Flip one reservation. Returns whether the item is now reserved.
    pub fn toggle(&mut self, id: LiveItemId) -> bool {
        if self.reserved.remove(&id) {
            false
        } else {
            self.reserved.insert(id);
            true
        }
    }

    /// Reserve an item.
    pub fn reserve(&mut self, id: LiveItemId) {
        self.reserved.insert(id);
    }

    /// Drop a reservation.
    pub fn release(&mut self, id: LiveItemId) {
        self.reserved.remove(&id);
    }

    /// Drop every reservation.
    pub fn clear(&mut self) {
        self.reserved.clear();
    }

    /// Current reservations.
    #[must_use]
    pub fn reserved(&self) -> &BTreeSet<LiveItemId> {
        &self.reserved
    }

    /// The pool as of the last [`sync`](Self::sync).
    #[must_use]
    pub fn pool(&self) -> &[LiveItemId] {
        &self.pool
    }

    /// Preview a command, or stop previewing with `None`.
    pub fn hover(&mut self, command_id: Option<u32>) {
        self.hovered = command_id;
    }

    /// Currencies the recommendation runs on: the hovered command's preview
    /// when it reports currency deltas, otherwise the session's own.
    #[must_use]
    pub fn effective_currencies(&self, session: &SessionState) -> Option<PerformanceCurrencies> {
        let current = session.currencies?;
        let preview = self.hovered.and_then(|id| {
            session
                .live_commands
                .iter()
                .find(|c| c.command_id == id && !c.performance.is_empty())
        });
        Some(preview.map_or(current, |command| preview_currencies(&current, command)))
    }

    /// What can be bought alongside the reservations. Only items on sale
    /// this turn are candidates; every reservation still counts towards the
    /// reserved cost.
    #[must_use]
    pub fn recommendation(&self, catalog: &LiveCatalog, session: &SessionState) -> BTreeSet<LiveItemId> {
        let currencies = self.effective_currencies(session);
        let on_sale = session.on_sale(&self.pool);
        recommend::recommend(catalog, &self.reserved, currencies.as_ref(), &on_sale)
    }

    /// The full panel.
    #[must_use]
    pub fn plan(&self, catalog: &LiveCatalog, session: &SessionState) -> LivePlan {
        let recommended = self.recommendation(catalog, session);
        LivePlan {
            pool: self.pool.clone(),
            on_sale: session.on_sale(&self.pool),
            future: catalog
                .future_items(session.game_stats.turn, &session.purchased)
                .unwrap_or_default(),
            reserved: self.reserved.clone(),
            reserved_cost: reserved_cost(catalog, &self.reserved),
            currencies: self.effective_currencies(session),
            cheapest: cheapest(catalog, &recommended),
            recommended,
            sources: training_sources(&session.live_commands),
        }
    }
}
