//! Purchasable live items: catalog, calendar-gated pool, purchase detection.
//!
//! The catalog is immutable once loaded. Availability is cumulative by
//! [`Era`]: the pool for a turn is every era's list up to the current one,
//! first-seen order, no duplicates.

pub mod recommend;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calendar::{self, Era};
use crate::error::{Result, TracksideError};
use crate::types::{Discipline, LiveItemId};

const BUNDLED_LIVE_ITEMS: &str = include_str!("../../assets/live_items.json");

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// What one discipline contributes to an item's price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    /// Currency spent.
    pub discipline: Discipline,
    /// Amount spent.
    pub amount: u32,
}

/// A purchasable live bonus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveItem {
    /// Catalog id.
    pub id: LiveItemId,
    /// Display name.
    pub name: String,
    /// What buying it does immediately.
    pub description: String,
    /// Game-side grouping tag.
    pub group_tag: u32,
    /// Multi-currency price.
    pub costs: Vec<Cost>,
    /// Lasting bonus text.
    pub bonus_text: String,
    /// Rarity weight; higher is more valuable.
    pub weight: u32,
}

impl LiveItem {
    /// Total price in one discipline (0 if the item does not cost it).
    #[must_use]
    pub fn cost(&self, discipline: Discipline) -> u32 {
        self.costs
            .iter()
            .filter(|c| c.discipline == discipline)
            .map(|c| c.amount)
            .sum()
    }

    /// Sum of the price over all disciplines.
    #[must_use]
    pub fn total_cost(&self) -> u32 {
        self.costs.iter().map(|c| c.amount).sum()
    }
}

// ---------------------------------------------------------------------------
// Asset format
// ---------------------------------------------------------------------------

/// One item as written in the asset: parallel discipline/cost arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveItemEntry {
    /// Catalog id; must match the map key.
    pub id: LiveItemId,
    /// Display name.
    pub name: String,
    /// Immediate effect text.
    #[serde(default)]
    pub description: String,
    /// Game-side grouping tag.
    #[serde(default, alias = "groupTag")]
    pub group_tag: u32,
    /// Numeric performance types (1-5).
    pub disciplines: Vec<u32>,
    /// Cost per entry of `disciplines`.
    pub costs: Vec<u32>,
    /// Lasting bonus text.
    #[serde(default, alias = "bonusText")]
    pub bonus_text: String,
    /// Rarity weight.
    #[serde(default)]
    pub weight: u32,
}

/// On-disk shape of the live catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveCatalogFile {
    /// Items keyed by id.
    #[serde(default)]
    pub items: BTreeMap<LiveItemId, LiveItemEntry>,
    /// Items introduced in each era, in display order.
    #[serde(default)]
    pub eras: BTreeMap<Era, Vec<LiveItemId>>,
    /// Purchase command id → item id.
    #[serde(default)]
    pub command_to_item: BTreeMap<u32, LiveItemId>,
}

impl LiveCatalogFile {
    /// Validate and build the catalog.
    ///
    /// # Errors
    /// Returns [`TracksideError::Catalog`] when an id does not match its key,
    /// cost arrays disagree in length, a discipline code is unknown, or an
    /// era lists an item that is not in the catalog.
    pub fn compile(self) -> Result<LiveCatalog> {
        let mut items = BTreeMap::new();
        for (key, entry) in self.items {
            if key != entry.id {
                return Err(TracksideError::Catalog(format!(
                    "live item keyed {key} declares id {}",
                    entry.id
                )));
            }
            if entry.disciplines.len() != entry.costs.len() {
                return Err(TracksideError::Catalog(format!(
                    "live item {key}: {} disciplines but {} costs",
                    entry.disciplines.len(),
                    entry.costs.len()
                )));
            }
            let costs = entry
                .disciplines
                .iter()
                .zip(&entry.costs)
                .map(|(&raw, &amount)| {
                    Discipline::from_perf_type(raw)
                        .map(|discipline| Cost { discipline, amount })
                        .ok_or_else(|| {
                            TracksideError::Catalog(format!("live item {key}: unknown discipline code {raw}"))
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            items.insert(
                key,
                LiveItem {
                    id: entry.id,
                    name: entry.name,
                    description: entry.description,
                    group_tag: entry.group_tag,
                    costs,
                    bonus_text: entry.bonus_text,
                    weight: entry.weight,
                },
            );
        }

        for (era, ids) in &self.eras {
            if let Some(missing) = ids.iter().find(|id| !items.contains_key(id)) {
                return Err(TracksideError::Catalog(format!(
                    "era {era:?} lists unknown live item {missing}"
                )));
            }
        }

        Ok(LiveCatalog {
            items,
            eras: self.eras,
            command_to_item: self.command_to_item.into_iter().collect(),
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Read-only live-item catalog with era availability and purchase mapping.
#[derive(Debug, Clone, Default)]
pub struct LiveCatalog {
    items: BTreeMap<LiveItemId, LiveItem>,
    eras: BTreeMap<Era, Vec<LiveItemId>>,
    command_to_item: HashMap<u32, LiveItemId>,
}

impl LiveCatalog {
    /// Parse and validate a JSON catalog.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: LiveCatalogFile = serde_json::from_str(json)?;
        file.compile()
    }

    /// Load a JSON catalog from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// The catalog bundled with the crate.
    ///
    /// # Errors
    /// Only fails if the bundled asset itself is broken.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_LIVE_ITEMS)
    }

    /// Look up an item.
    #[must_use]
    pub fn get(&self, id: LiveItemId) -> Option<&LiveItem> {
        self.items.get(&id)
    }

    /// All items, by id.
    pub fn items(&self) -> impl Iterator<Item = &LiveItem> {
        self.items.values()
    }

    /// Item bought by a purchase command, if the command is a known purchase.
    #[must_use]
    pub fn item_for_command(&self, command_id: u32) -> Option<LiveItemId> {
        self.command_to_item.get(&command_id).copied()
    }

    /// Map raw purchase command ids to item ids, dropping unknown commands
    /// and duplicates while keeping first-seen order.
    pub fn purchased_from_commands<I>(&self, command_ids: I) -> Vec<LiveItemId>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut seen = HashSet::new();
        command_ids
            .into_iter()
            .filter_map(|cmd| self.item_for_command(cmd))
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Every item available at the given turn, ordered by era then catalog
    /// order, without duplicates.
    ///
    /// # Errors
    /// Returns [`TracksideError::InvalidTurn`] for turn 0.
    pub fn pool_for_turn(&self, turn: u32) -> Result<Vec<LiveItemId>> {
        let era = Era::of(calendar::turn_to_date(turn)?);
        let mut seen = HashSet::new();
        Ok(era
            .up_to()
            .filter_map(|e| self.eras.get(&e))
            .flatten()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect())
    }

    /// The pool minus anything already purchased: what the planner and
    /// recommender work with.
    ///
    /// # Errors
    /// Returns [`TracksideError::InvalidTurn`] for turn 0.
    pub fn available_pool(&self, turn: u32, purchased: &[LiveItemId]) -> Result<Vec<LiveItemId>> {
        let mut pool = self.pool_for_turn(turn)?;
        pool.retain(|id| !purchased.contains(id));
        Ok(pool)
    }

    /// Catalog items not yet available at this turn and not purchased.
    ///
    /// # Errors
    /// Returns [`TracksideError::InvalidTurn`] for turn 0.
    pub fn future_items(&self, turn: u32, purchased: &[LiveItemId]) -> Result<Vec<LiveItemId>> {
        let pool: HashSet<_> = self.pool_for_turn(turn)?.into_iter().collect();
        Ok(self
            .items
            .keys()
            .copied()
            .filter(|id| !pool.contains(id) && !purchased.contains(id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> LiveCatalog {
        LiveCatalog::bundled().expect("bundled live catalog is valid")
    }

    #[test]
    fn bundled_catalog_shape() {
        let catalog = catalog();
        assert_eq!(catalog.items().count(), 21);
        let item = catalog.get(40003).expect("RUN×RUN is catalogued");
        assert_eq!(item.costs.len(), 3);
        assert_eq!(item.cost(Discipline::Visual), 16);
        assert_eq!(item.cost(Discipline::Vocal), 0);
        assert_eq!(item.total_cost(), 44);
    }

    #[test]
    fn first_year_pool() {
        let pool = catalog().pool_for_turn(1).expect("valid turn");
        assert_eq!(pool, vec![40001, 40002, 40003, 40020, 40006, 40007, 40009, 40010]);
    }

    #[test]
    fn pools_are_cumulative() {
        let catalog = catalog();
        let y1 = catalog.pool_for_turn(24).expect("valid");
        let y2a = catalog.pool_for_turn(25).expect("valid");
        let y2b = catalog.pool_for_turn(37).expect("valid");
        let y3 = catalog.pool_for_turn(60).expect("valid");
        assert!(y2a.starts_with(&y1));
        assert!(y2b.starts_with(&y2a));
        assert!(y3.starts_with(&y2b));
        assert_eq!(y3.len(), 21);
    }

    #[test]
    fn pool_rejects_turn_zero() {
        assert!(matches!(catalog().pool_for_turn(0), Err(TracksideError::InvalidTurn(0))));
    }

    #[test]
    fn duplicates_across_eras_keep_first_position() {
        let catalog = LiveCatalog::from_json(
            r#"{
                "items": {
                    "1": { "id": 1, "name": "a", "disciplines": [1], "costs": [5] },
                    "2": { "id": 2, "name": "b", "disciplines": [2], "costs": [5] }
                },
                "eras": { "year1": [1, 2], "year2_first_half": [2, 1] }
            }"#,
        )
        .expect("valid");
        assert_eq!(catalog.pool_for_turn(30).expect("valid"), vec![1, 2]);
    }

    #[test]
    fn purchased_items_leave_the_pool() {
        let catalog = catalog();
        let pool = catalog.available_pool(1, &[40002, 40010]).expect("valid");
        assert!(!pool.contains(&40002));
        assert!(!pool.contains(&40010));
        assert_eq!(pool.len(), 6);
    }

    #[test]
    fn future_items_exclude_pool_and_purchases() {
        let catalog = catalog();
        let future = catalog.future_items(1, &[40000]).expect("valid");
        assert!(!future.contains(&40001));
        assert!(!future.contains(&40000));
        assert!(future.contains(&40018));
        assert_eq!(future.len(), 21 - 8 - 1);
    }

    #[test]
    fn purchase_commands_map_and_dedupe() {
        let catalog = catalog();
        let ids = catalog.purchased_from_commands([1044, 9999, 1032, 1044, 1036]);
        assert_eq!(ids, vec![40002, 40000, 40092]);
    }

    #[test]
    fn malformed_assets_are_rejected() {
        let mismatched = r#"{ "items": { "1": { "id": 2, "name": "x", "disciplines": [], "costs": [] } } }"#;
        assert!(matches!(LiveCatalog::from_json(mismatched), Err(TracksideError::Catalog(_))));

        let lengths = r#"{ "items": { "1": { "id": 1, "name": "x", "disciplines": [1, 2], "costs": [3] } } }"#;
        assert!(matches!(LiveCatalog::from_json(lengths), Err(TracksideError::Catalog(_))));

        let code = r#"{ "items": { "1": { "id": 1, "name": "x", "disciplines": [9], "costs": [3] } } }"#;
        assert!(matches!(LiveCatalog::from_json(code), Err(TracksideError::Catalog(_))));

        let era = r#"{ "eras": { "year1": [77] } }"#;
        assert!(matches!(LiveCatalog::from_json(era), Err(TracksideError::Catalog(_))));
    }
}
