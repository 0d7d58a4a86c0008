//! Event catalog asset format and loading.
//!
//! The catalog is a JSON document:
//!
//! ```json
//! {
//!   "exact":    { "<story id>": { "name": "...", "options": [ { "<index>": { "label", "detail", "type" } } ] } },
//!   "patterns": [ { "pattern": "<regex>", "rule": { "name": "...", "options": [...] } } ]
//! }
//! ```
//!
//! Pattern order in the file is match order.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{EventCatalog, EventRule};
use crate::error::{Result, TracksideError};
use crate::types::StoryId;

const BUNDLED_EVENTS: &str = include_str!("../../assets/events.json");

/// On-disk shape of an event catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventCatalogFile {
    /// Rules keyed by decimal story id.
    #[serde(default)]
    pub exact: BTreeMap<String, EventRule>,
    /// Ordered pattern rules.
    #[serde(default)]
    pub patterns: Vec<PatternEntry>,
}

/// One pattern rule as written in the asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternEntry {
    /// Regular expression matched against the decimal story id.
    pub pattern: String,
    /// Rule returned on match.
    pub rule: EventRule,
}

impl EventCatalogFile {
    /// Validate keys, compile patterns and build the lookup tables.
    ///
    /// # Errors
    /// Returns [`TracksideError::Catalog`] for a key that is not a canonical
    /// decimal id, or [`TracksideError::InvalidPattern`] for a bad regex.
    pub fn compile(self) -> Result<EventCatalog> {
        let mut catalog = EventCatalog::new();
        for (key, rule) in self.exact {
            let story_id: StoryId = key
                .parse()
                .map_err(|_| TracksideError::Catalog(format!("story id `{key}` is not a decimal integer")))?;
            if story_id.to_string() != key {
                return Err(TracksideError::Catalog(format!(
                    "story id `{key}` is not in canonical form (expected `{story_id}`)"
                )));
            }
            catalog.insert_exact(story_id, rule);
        }
        for entry in self.patterns {
            catalog.push_pattern(&entry.pattern, entry.rule)?;
        }
        Ok(catalog)
    }
}

impl EventCatalog {
    /// Parse and compile a JSON catalog.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: EventCatalogFile = serde_json::from_str(json)?;
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
        Self::from_json(BUNDLED_EVENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OptionKind;

    #[test]
    fn bundled_catalog_loads() {
        let catalog = EventCatalog::bundled().expect("bundled catalog is valid");
        assert!(catalog.exact_len() >= 4);
        assert_eq!(catalog.patterns().len(), 2);

        let rule = catalog.resolve(830_078_001).expect("exact entry");
        assert_eq!(rule.option(0, 1).map(|o| o.kind), Some(OptionKind::Correct));
        assert_eq!(rule.option(0, 2).map(|o| o.kind), Some(OptionKind::Wrong));
    }

    #[test]
    fn bundled_patterns_match_race_events() {
        let catalog = EventCatalog::bundled().expect("bundled catalog is valid");
        let win = catalog.resolve(501_006_708).expect("race win pattern");
        let end = catalog.resolve(502_010_709).expect("race end pattern");
        assert_ne!(win.name, end.name);
        assert_eq!(win.options.len(), 2);
        assert_eq!(win.option(1, 3).map(|o| o.kind), Some(OptionKind::Correct));
        assert!(catalog.resolve(501_006_710).is_none());
    }

    #[test]
    fn sparse_and_empty_groups_parse() {
        let catalog = EventCatalog::from_json(
            r#"{
                "exact": {
                    "42": { "name": "sparse", "options": [ {}, { "3": { "label": "x", "detail": "y", "type": "neutral" } } ] }
                }
            }"#,
        )
        .expect("valid catalog");
        let rule = catalog.resolve(42).expect("entry");
        assert!(rule.options[0].is_empty());
        assert_eq!(rule.option(1, 3).map(|o| o.kind), Some(OptionKind::Neutral));
    }

    #[test]
    fn desp_is_accepted_for_label() {
        let catalog = EventCatalog::from_json(
            r#"{ "exact": { "7": { "name": "n", "options": [ { "1": { "desp": "Speed +10", "detail": "", "type": "correct" } } ] } } }"#,
        )
        .expect("valid catalog");
        let rule = catalog.resolve(7).expect("entry");
        assert_eq!(rule.option(0, 1).map(|o| o.label.as_str()), Some("Speed +10"));
    }

    #[test]
    fn non_canonical_ids_are_rejected() {
        let err = EventCatalog::from_json(r#"{ "exact": { "007": { "name": "bond" } } }"#)
            .expect_err("leading zeros");
        assert!(matches!(err, TracksideError::Catalog(_)));

        let err = EventCatalog::from_json(r#"{ "exact": { "abc": { "name": "letters" } } }"#)
            .expect_err("not a number");
        assert!(matches!(err, TracksideError::Catalog(_)));
    }

    #[test]
    fn bad_pattern_is_rejected() {
        let err = EventCatalog::from_json(
            r#"{ "patterns": [ { "pattern": "([", "rule": { "name": "broken" } } ] }"#,
        )
        .expect_err("bad regex");
        assert!(matches!(err, TracksideError::InvalidPattern { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("events.json");
        std::fs::write(&path, r#"{ "exact": { "9": { "name": "nine" } } }"#).expect("write");
        let catalog = EventCatalog::from_file(&path).expect("load");
        assert_eq!(catalog.resolve(9).map(|r| r.name.as_str()), Some("nine"));
    }
}
