//! Narrative event rules and their resolution.
//!
//! A rule names an event and lists one [`ChoiceGroup`] per choice position:
//! the Nth choice the player faced resolves against the Nth group. Groups are
//! sparse because the catalog is filled in by watching real play, so "not
//! catalogued" is an ordinary, representable state.
//!
//! Lookup order:
//! 1. exact story id (decimal string form)
//! 2. first pattern rule whose regex matches the id, in catalog order
//! 3. nothing; the caller falls back to placeholders

pub mod catalog;

use std::collections::{BTreeMap, HashMap};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TracksideError};
use crate::types::{EventOption, StoryId};

pub use catalog::EventCatalogFile;

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Known outcomes for one choice position, keyed by selection index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChoiceGroup(BTreeMap<u32, EventOption>);

impl ChoiceGroup {
    /// An empty group: this choice's outcomes are not catalogued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an outcome for a selection index.
    #[must_use]
    pub fn with(mut self, selection_index: u32, option: EventOption) -> Self {
        self.0.insert(selection_index, option);
        self
    }

    /// Outcome for a selection index, if catalogued.
    #[must_use]
    pub fn get(&self, selection_index: u32) -> Option<&EventOption> {
        self.0.get(&selection_index)
    }

    /// Whether no outcome is catalogued for this choice.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of catalogued outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(u32, EventOption)> for ChoiceGroup {
    fn from_iter<I: IntoIterator<Item = (u32, EventOption)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A named event with its positional choice groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRule {
    /// Display name.
    pub name: String,
    /// One group per choice position.
    #[serde(default)]
    pub options: Vec<ChoiceGroup>,
}

impl EventRule {
    /// Create a rule.
    #[must_use]
    pub fn new(name: impl Into<String>, options: Vec<ChoiceGroup>) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }

    /// Catalogued outcome for a choice position and selection index.
    #[must_use]
    pub fn option(&self, position: usize, selection_index: u32) -> Option<&EventOption> {
        self.options.get(position)?.get(selection_index)
    }
}

/// A rule attached to a story-id pattern.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pattern: Regex,
    rule: EventRule,
}

impl PatternRule {
    /// Compile a pattern rule.
    ///
    /// # Errors
    /// Returns [`TracksideError::InvalidPattern`] if the regex does not compile.
    pub fn new(pattern: &str, rule: EventRule) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|source| TracksideError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern, rule })
    }

    /// The pattern's source text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// The attached rule.
    #[must_use]
    pub fn rule(&self) -> &EventRule {
        &self.rule
    }
}

// ---------------------------------------------------------------------------
// Catalog & Resolver
// ---------------------------------------------------------------------------

/// Read-only table of event rules: exact entries plus ordered pattern rules.
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    exact: HashMap<String, EventRule>,
    patterns: Vec<PatternRule>,
}

impl EventCatalog {
    /// An empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule for one exact story id. Replaces any earlier entry.
    pub fn insert_exact(&mut self, story_id: StoryId, rule: EventRule) {
        self.exact.insert(story_id.to_string(), rule);
    }

    /// Append a pattern rule. Earlier patterns win over later ones.
    ///
    /// # Errors
    /// Returns [`TracksideError::InvalidPattern`] if the regex does not compile.
    pub fn push_pattern(&mut self, pattern: &str, rule: EventRule) -> Result<()> {
        self.patterns.push(PatternRule::new(pattern, rule)?);
        Ok(())
    }

    /// Find the rule for a story id. Exact entries take priority over
    /// patterns; among patterns, the first match in catalog order wins.
    #[must_use]
    pub fn resolve(&self, story_id: StoryId) -> Option<&EventRule> {
        let key = story_id.to_string();
        if let Some(rule) = self.exact.get(&key) {
            return Some(rule);
        }
        self.patterns
            .iter()
            .find(|entry| entry.pattern.is_match(&key))
            .map(|entry| &entry.rule)
    }

    /// Number of exact entries.
    #[must_use]
    pub fn exact_len(&self) -> usize {
        self.exact.len()
    }

    /// Pattern rules in match order.
    #[must_use]
    pub fn patterns(&self) -> &[PatternRule] {
        &self.patterns
    }
}

/// Resolve one observed choice against a rule.
///
/// Never fails: a missing rule, group or index yields an
/// [`OptionKind::Unknown`](crate::types::OptionKind::Unknown) placeholder that
/// carries the raw selection index.
#[must_use]
pub fn resolve_choice(rule: Option<&EventRule>, position: usize, selection_index: u32) -> EventOption {
    rule.and_then(|r| r.option(position, selection_index))
        .cloned()
        .unwrap_or_else(|| EventOption::unknown(selection_index))
}
