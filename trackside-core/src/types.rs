//! Core type definitions for the normalised session model.
//!
//! Everything here is plain data: serializable, cheap to clone, and free of
//! any knowledge about the wire format it was extracted from.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Identifier of a narrative event (the game's story id).
pub type StoryId = u64;

/// Identifier of a purchasable live item in the live catalog.
pub type LiveItemId = u32;

// ---------------------------------------------------------------------------
// Gauges & Character Stats
// ---------------------------------------------------------------------------

/// A bounded numeric gauge: current value and its ceiling.
///
/// Values are taken from the game as-is; `value <= max` is expected but not
/// enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gauge {
    /// Current value.
    pub value: u32,
    /// Maximum value.
    pub max: u32,
}

impl Gauge {
    /// Create a gauge from a (value, max) pair.
    #[must_use]
    pub const fn new(value: u32, max: u32) -> Self {
        Self { value, max }
    }
}

impl fmt::Display for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.value, self.max)
    }
}

/// The character's trainable stats, vitality and skill-point counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStats {
    /// Speed.
    pub speed: Gauge,
    /// Stamina.
    pub stamina: Gauge,
    /// Power.
    pub power: Gauge,
    /// Wisdom.
    pub wiz: Gauge,
    /// Guts.
    pub guts: Gauge,
    /// Vitality (energy spent by training, restored by rest).
    pub vital: Gauge,
    /// Unspent skill points. A bare counter with no ceiling.
    pub skill_point: u32,
}

/// Turn-derived scalars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    /// Monotonic turn counter, starting at 1 once a run is in progress.
    pub turn: u32,
    /// Shop coins held.
    pub coin_num: u32,
}

// ---------------------------------------------------------------------------
// Training Commands
// ---------------------------------------------------------------------------

/// What a training delta applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum TargetType {
    /// Speed stat.
    Speed,
    /// Stamina stat.
    Stamina,
    /// Power stat.
    Power,
    /// Guts stat.
    Guts,
    /// Wisdom stat.
    Wiz,
    /// Vitality. Rendered apart from stat gains.
    Vital,
    /// Skill points.
    SkillPoints,
    /// Any target type this engine has no name for.
    Other(u32),
}

impl TargetType {
    /// The five trainable stats, in display order.
    pub const STATS: [Self; 5] = [Self::Speed, Self::Stamina, Self::Power, Self::Guts, Self::Wiz];

    /// Whether this target is the reserved vitality/recovery type.
    #[must_use]
    pub fn is_vital(self) -> bool {
        self == Self::Vital
    }

    /// Short human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Stamina => "stamina",
            Self::Power => "power",
            Self::Guts => "guts",
            Self::Wiz => "wiz",
            Self::Vital => "vital",
            Self::SkillPoints => "skill points",
            Self::Other(_) => "other",
        }
    }
}

impl From<u32> for TargetType {
    fn from(raw: u32) -> Self {
        match raw {
            1 => Self::Speed,
            2 => Self::Stamina,
            3 => Self::Power,
            4 => Self::Guts,
            5 => Self::Wiz,
            10 => Self::Vital,
            30 => Self::SkillPoints,
            other => Self::Other(other),
        }
    }
}

impl From<TargetType> for u32 {
    fn from(target: TargetType) -> Self {
        match target {
            TargetType::Speed => 1,
            TargetType::Stamina => 2,
            TargetType::Power => 3,
            TargetType::Guts => 4,
            TargetType::Wiz => 5,
            TargetType::Vital => 10,
            TargetType::SkillPoints => 30,
            TargetType::Other(raw) => raw,
        }
    }
}

/// One signed change a command would apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDelta {
    /// What the change applies to.
    pub target: TargetType,
    /// Signed amount.
    pub value: i32,
}

/// How risky a training command is, bucketed from its failure rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureRisk {
    /// 0%.
    None,
    /// Below 20%.
    Low,
    /// 20% to 49%.
    Elevated,
    /// 50% and above.
    High,
}

impl FailureRisk {
    /// Bucket a failure percentage.
    #[must_use]
    pub fn from_rate(rate: u32) -> Self {
        match rate {
            0 => Self::None,
            1..=19 => Self::Low,
            20..=49 => Self::Elevated,
            _ => Self::High,
        }
    }
}

/// The stat a training command id trains (regular and summer-camp variants).
#[must_use]
pub fn training_target(command_id: u32) -> Option<TargetType> {
    match command_id {
        101 | 601 => Some(TargetType::Speed),
        105 | 602 => Some(TargetType::Stamina),
        102 | 603 => Some(TargetType::Power),
        103 | 604 => Some(TargetType::Guts),
        106 | 605 => Some(TargetType::Wiz),
        _ => None,
    }
}

/// A selectable training action as reported for the current turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingCommand {
    /// Stable command id (e.g. 101 for speed training).
    pub command_id: u32,
    /// Command category as reported by the game.
    pub command_type: u32,
    /// Whether the command can be chosen this turn.
    pub enabled: bool,
    /// Failure probability, 0-100.
    pub failure_rate: u32,
    /// Facility level.
    pub level: u32,
    /// Partner positions that joined this training.
    pub training_partners: Vec<u32>,
    /// Partner positions carrying a hint/tip event.
    pub tips_partners: Vec<u32>,
    /// Stat and vitality deltas, in reported order.
    pub params: Vec<ParamDelta>,
}

impl TrainingCommand {
    /// Deltas that are not vitality effects.
    pub fn gains(&self) -> impl Iterator<Item = &ParamDelta> {
        self.params.iter().filter(|p| !p.target.is_vital())
    }

    /// Net vitality change, if the command reports one.
    #[must_use]
    pub fn vital_delta(&self) -> Option<i32> {
        let mut deltas = self.params.iter().filter(|p| p.target.is_vital()).peekable();
        deltas.peek()?;
        Some(deltas.map(|p| p.value).sum())
    }

    /// The stat this command trains, for the known training commands.
    #[must_use]
    pub fn primary_target(&self) -> Option<TargetType> {
        training_target(self.command_id)
    }

    /// Display name for the known training commands.
    #[must_use]
    pub fn display_name(&self) -> Option<&'static str> {
        match self.command_id {
            101 => Some("Speed training"),
            105 => Some("Stamina training"),
            102 => Some("Power training"),
            103 => Some("Guts training"),
            106 => Some("Wisdom training"),
            601 => Some("Speed summer camp"),
            602 => Some("Stamina summer camp"),
            603 => Some("Power summer camp"),
            604 => Some("Guts summer camp"),
            605 => Some("Wisdom summer camp"),
            _ => None,
        }
    }

    /// Failure-rate bucket.
    #[must_use]
    pub fn risk(&self) -> FailureRisk {
        FailureRisk::from_rate(self.failure_rate)
    }
}

// ---------------------------------------------------------------------------
// Partners
// ---------------------------------------------------------------------------

/// Positions at or above this value are scenario guests, not roster slots.
pub const GUEST_POSITION_BASE: u32 = 1000;

/// Relationship gauge for one partner in play.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerEvaluation {
    /// Slot position (or guest character id).
    pub position: u32,
    /// Support card in that slot, when the roster join succeeded.
    pub support_card_id: Option<u32>,
    /// Bond gauge, 0-100.
    pub evaluation: u32,
    /// Limit-break count of the linked card.
    pub limit_break: u32,
    /// Experience of the linked card.
    pub exp: u32,
}

impl PartnerEvaluation {
    /// Whether this entry is a scenario guest rather than a roster slot.
    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.position >= GUEST_POSITION_BASE
    }
}

// ---------------------------------------------------------------------------
// Performance Currencies
// ---------------------------------------------------------------------------

/// One of the five performance disciplines that live items cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discipline {
    /// Dance.
    Dance,
    /// Passion.
    Passion,
    /// Vocal.
    Vocal,
    /// Visual.
    Visual,
    /// Mental.
    Mental,
}

impl Discipline {
    /// All disciplines in wire order.
    pub const ALL: [Self; 5] = [Self::Dance, Self::Passion, Self::Vocal, Self::Visual, Self::Mental];

    /// Map the game's numeric performance type (1-5).
    #[must_use]
    pub fn from_perf_type(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(Self::Dance),
            2 => Some(Self::Passion),
            3 => Some(Self::Vocal),
            4 => Some(Self::Visual),
            5 => Some(Self::Mental),
            _ => None,
        }
    }

    /// Numeric performance type used on the wire.
    #[must_use]
    pub fn perf_type(self) -> u32 {
        match self {
            Self::Dance => 1,
            Self::Passion => 2,
            Self::Vocal => 3,
            Self::Visual => 4,
            Self::Mental => 5,
        }
    }

    /// Position in [`Discipline::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self.perf_type() as usize - 1
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dance => "dance",
            Self::Passion => "passion",
            Self::Vocal => "vocal",
            Self::Visual => "visual",
            Self::Mental => "mental",
        };
        f.write_str(name)
    }
}

/// The five performance currencies, each a (current, max) gauge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceCurrencies {
    /// Dance.
    pub dance: Gauge,
    /// Passion.
    pub passion: Gauge,
    /// Vocal.
    pub vocal: Gauge,
    /// Visual.
    pub visual: Gauge,
    /// Mental.
    pub mental: Gauge,
}

impl PerformanceCurrencies {
    /// Gauge for a discipline.
    #[must_use]
    pub fn get(&self, discipline: Discipline) -> Gauge {
        match discipline {
            Discipline::Dance => self.dance,
            Discipline::Passion => self.passion,
            Discipline::Vocal => self.vocal,
            Discipline::Visual => self.visual,
            Discipline::Mental => self.mental,
        }
    }

    /// Mutable gauge for a discipline.
    pub fn get_mut(&mut self, discipline: Discipline) -> &mut Gauge {
        match discipline {
            Discipline::Dance => &mut self.dance,
            Discipline::Passion => &mut self.passion,
            Discipline::Vocal => &mut self.vocal,
            Discipline::Visual => &mut self.visual,
            Discipline::Mental => &mut self.mental,
        }
    }

    /// Current value for a discipline.
    #[must_use]
    pub fn value(&self, discipline: Discipline) -> u32 {
        self.get(discipline).value
    }
}

/// A signed change to one performance currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceDelta {
    /// Currency affected.
    pub discipline: Discipline,
    /// Signed amount.
    pub value: i32,
}

/// A command as reported by the live block: what it would add to the
/// performance currencies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveCommand {
    /// Command id, joinable with [`TrainingCommand::command_id`].
    pub command_id: u32,
    /// Command category.
    pub command_type: u32,
    /// Currency deltas.
    pub performance: Vec<PerformanceDelta>,
    /// Stat deltas reported alongside.
    pub params: Vec<ParamDelta>,
}

// ---------------------------------------------------------------------------
// Narrative Events
// ---------------------------------------------------------------------------

/// Classification of a catalogued choice outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// The choice the catalog recommends.
    Correct,
    /// A choice the catalog advises against.
    Wrong,
    /// Neither better nor worse.
    Neutral,
    /// Not catalogued.
    Unknown,
}

/// A labelled outcome for one narrative choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOption {
    /// Short label.
    #[serde(alias = "desp")]
    pub label: String,
    /// Longer description.
    pub detail: String,
    /// Outcome classification.
    #[serde(rename = "type")]
    pub kind: OptionKind,
}

impl EventOption {
    /// Placeholder for a selection index with no catalogued outcome.
    #[must_use]
    pub fn unknown(selection_index: u32) -> Self {
        Self {
            label: format!("outcome #{selection_index}"),
            detail: "Not catalogued yet. The same outcome id always has the same effect, so it can be \
                     confirmed by triggering the event again."
                .to_string(),
            kind: OptionKind::Unknown,
        }
    }
}

/// A narrative event the player just went through, with one resolved
/// outcome per choice they faced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Story id.
    pub event_id: StoryId,
    /// Display name (catalog name, or a generic fallback).
    pub event_name: String,
    /// Resolved outcome for each observed choice, in order.
    pub options: Vec<EventOption>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_type_round_trips_unknown_values() {
        assert_eq!(TargetType::from(10), TargetType::Vital);
        assert_eq!(TargetType::from(77), TargetType::Other(77));
        assert_eq!(u32::from(TargetType::Other(77)), 77);
        assert_eq!(u32::from(TargetType::SkillPoints), 30);
    }

    #[test]
    fn vital_deltas_are_split_from_gains() {
        let cmd = TrainingCommand {
            command_id: 101,
            params: vec![
                ParamDelta { target: TargetType::Speed, value: 10 },
                ParamDelta { target: TargetType::Power, value: 4 },
                ParamDelta { target: TargetType::Vital, value: -21 },
            ],
            ..TrainingCommand::default()
        };
        assert_eq!(cmd.gains().count(), 2);
        assert_eq!(cmd.vital_delta(), Some(-21));
        assert_eq!(cmd.primary_target(), Some(TargetType::Speed));
        assert_eq!(cmd.display_name(), Some("Speed training"));
    }

    #[test]
    fn no_vital_delta_when_none_reported() {
        let cmd = TrainingCommand {
            params: vec![ParamDelta { target: TargetType::Wiz, value: 8 }],
            ..TrainingCommand::default()
        };
        assert_eq!(cmd.vital_delta(), None);
    }

    #[test]
    fn failure_risk_buckets() {
        assert_eq!(FailureRisk::from_rate(0), FailureRisk::None);
        assert_eq!(FailureRisk::from_rate(19), FailureRisk::Low);
        assert_eq!(FailureRisk::from_rate(20), FailureRisk::Elevated);
        assert_eq!(FailureRisk::from_rate(50), FailureRisk::High);
        assert_eq!(FailureRisk::from_rate(100), FailureRisk::High);
    }

    #[test]
    fn discipline_perf_type_mapping() {
        for d in Discipline::ALL {
            assert_eq!(Discipline::from_perf_type(d.perf_type()), Some(d));
            assert_eq!(Discipline::ALL[d.index()], d);
        }
        assert_eq!(Discipline::from_perf_type(0), None);
        assert_eq!(Discipline::from_perf_type(6), None);
    }

    #[test]
    fn option_kind_serializes_lowercase_under_type_key() {
        let json = serde_json::to_value(EventOption::unknown(3)).expect("serialize");
        assert_eq!(json["type"], "unknown");
        assert_eq!(json["label"], "outcome #3");
    }

    #[test]
    fn guests_are_positions_from_1000() {
        let slot = PartnerEvaluation { position: 3, ..PartnerEvaluation::default() };
        let guest = PartnerEvaluation { position: 1021, ..PartnerEvaluation::default() };
        assert!(!slot.is_guest());
        assert!(guest.is_guest());
    }
}
