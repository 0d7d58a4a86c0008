//! Snapshot extractor: raw snapshot → [`PartialSessionState`].
//!
//! Never fails. A snapshot without a character block is skipped (`None`);
//! anything else that is missing or malformed defaults to zero or empty. A
//! list with no entries is reported as absent so the merge keeps the
//! previous value.

use tracing::{debug, info};

use crate::catalogs::Catalogs;
use crate::events::resolve_choice;
use crate::metrics::EngineCounters;
use crate::session::{PartialSessionState, Reported};
use crate::snapshot::{RawNode, RawSnapshot};
use crate::types::{
    CharacterStats, Discipline, EventOption, GameEvent, Gauge, LiveCommand, OptionKind, ParamDelta,
    PartnerEvaluation, PerformanceCurrencies, PerformanceDelta, TargetType, TrainingCommand,
};

/// Stat keys in `chara_info`; each has a `max_` twin.
const STAT_KEYS: [&str; 6] = ["speed", "stamina", "power", "wiz", "guts", "vital"];

/// Extract with default settings and no counters.
#[must_use]
pub fn extract(raw: &RawSnapshot, catalogs: &Catalogs) -> Option<PartialSessionState> {
    Extractor::new(catalogs).extract(raw)
}

/// Configurable extractor bound to a set of catalogs.
#[derive(Clone, Copy)]
pub struct Extractor<'a> {
    catalogs: &'a Catalogs,
    counters: Option<&'a EngineCounters>,
    log_choices: bool,
}

impl<'a> Extractor<'a> {
    /// Extractor over the given catalogs.
    #[must_use]
    pub fn new(catalogs: &'a Catalogs) -> Self {
        Self {
            catalogs,
            counters: None,
            log_choices: false,
        }
    }

    /// Count skipped snapshots and unresolved events into `counters`.
    #[must_use]
    pub fn with_counters(mut self, counters: &'a EngineCounters) -> Self {
        self.counters = Some(counters);
        self
    }

    /// Also log choices that resolved. Unresolved ones are always logged.
    #[must_use]
    pub fn log_choice_observations(mut self, enabled: bool) -> Self {
        self.log_choices = enabled;
        self
    }

    /// Map one snapshot. `None` when it has no character block.
    #[must_use]
    pub fn extract(&self, raw: &RawSnapshot) -> Option<PartialSessionState> {
        let Some(chara) = raw.chara_info() else {
            debug!("snapshot has no character block, skipping");
            self.bump(|c| &c.snapshots_skipped);
            return None;
        };

        let purchased = raw
            .purchase_command_ids()
            .map(|ids| self.catalogs.live.purchased_from_commands(ids))
            .unwrap_or_default();
        let offered: Vec<_> = raw
            .offered_square_ids()
            .unwrap_or_default()
            .into_iter()
            .filter(|id| self.catalogs.live.get(*id).is_some())
            .collect();

        Some(PartialSessionState {
            turn: chara.u32("turn").into(),
            coin_num: raw.coin_num().into(),
            stats: character_stats(chara).into(),
            commands: Reported::non_empty(
                raw.training_commands()
                    .unwrap_or_default()
                    .into_iter()
                    .map(training_command)
                    .collect(),
            ),
            partners: Reported::non_empty(partners(chara)),
            events: Reported::non_empty(self.events(raw)),
            currencies: raw.live_performance().map(currencies).into(),
            live_commands: Reported::non_empty(
                raw.live_commands()
                    .unwrap_or_default()
                    .into_iter()
                    .map(live_command)
                    .collect(),
            ),
            offered_items: Reported::non_empty(offered),
            purchased: Reported::non_empty(purchased),
        })
    }

    fn events(&self, raw: &RawSnapshot) -> Vec<GameEvent> {
        raw.unchecked_events()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|ev| self.event(ev))
            .collect()
    }

    fn event(&self, ev: RawNode<'_>) -> Option<GameEvent> {
        let Some(story_id) = ev.u64("story_id") else {
            info!(event = %ev.value(), "unchecked event without story id, dropped");
            self.bump(|c| &c.unknown_events);
            return None;
        };
        let selections: Vec<u32> = ev
            .child("event_contents_info")
            .and_then(|info| info.list("choice_array"))
            .unwrap_or_default()
            .into_iter()
            .map(|choice| choice.u32("select_index").unwrap_or(0))
            .collect();

        let rule = self.catalogs.events.resolve(story_id);
        if rule.is_none() {
            info!(story_id, choices = ?selections, "no catalogued rule for event");
            self.bump(|c| &c.unknown_events);
        }

        let options: Vec<EventOption> = selections
            .iter()
            .enumerate()
            .map(|(position, &select_index)| {
                let option = resolve_choice(rule, position, select_index);
                if option.kind == OptionKind::Unknown {
                    self.bump(|c| &c.unknown_choices);
                    if rule.is_some() {
                        info!(story_id, position, select_index, "no catalogued outcome for choice");
                    }
                } else if self.log_choices {
                    info!(story_id, position, select_index, label = %option.label, "choice observed");
                }
                option
            })
            .collect();

        Some(GameEvent {
            event_id: story_id,
            event_name: rule.map_or_else(|| format!("event {story_id}"), |r| r.name.clone()),
            options,
        })
    }

    fn bump(&self, counter: impl Fn(&EngineCounters) -> &std::sync::atomic::AtomicU64) {
        if let Some(counters) = self.counters {
            EngineCounters::bump(counter(counters));
        }
    }
}

// ---- Field mappers ----

fn gauge(node: RawNode<'_>, key: &str) -> Gauge {
    Gauge::new(
        node.u32(key).unwrap_or(0),
        node.u32(&format!("max_{key}")).unwrap_or(0),
    )
}

/// Stats count as reported when any stat key is there at all.
fn character_stats(chara: RawNode<'_>) -> Option<CharacterStats> {
    let reported = STAT_KEYS.iter().any(|k| chara.has(k)) || chara.has("skill_point");
    if !reported {
        debug!("character block carries no stats");
        return None;
    }
    Some(CharacterStats {
        speed: gauge(chara, "speed"),
        stamina: gauge(chara, "stamina"),
        power: gauge(chara, "power"),
        wiz: gauge(chara, "wiz"),
        guts: gauge(chara, "guts"),
        vital: gauge(chara, "vital"),
        skill_point: chara.u32("skill_point").unwrap_or(0),
    })
}

fn params(node: RawNode<'_>) -> Vec<ParamDelta> {
    node.list("params_inc_dec_info_array")
        .unwrap_or_default()
        .into_iter()
        .map(|p| ParamDelta {
            target: TargetType::from(p.u32("target_type").unwrap_or(0)),
            value: p.i32("value").unwrap_or(0),
        })
        .collect()
}

fn training_command(cmd: RawNode<'_>) -> TrainingCommand {
    TrainingCommand {
        command_id: cmd.u32("command_id").unwrap_or(0),
        command_type: cmd.u32("command_type").unwrap_or(0),
        enabled: cmd.flag("is_enable").unwrap_or(false),
        failure_rate: cmd.u32("failure_rate").unwrap_or(0),
        level: cmd.u32("level").unwrap_or(0),
        training_partners: cmd.u32_list("training_partner_array").unwrap_or_default(),
        tips_partners: cmd.u32_list("tips_event_partner_array").unwrap_or_default(),
        params: params(cmd),
    }
}

fn live_command(cmd: RawNode<'_>) -> LiveCommand {
    let performance = cmd
        .list("performance_inc_dec_info_array")
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| {
            let raw_type = p.u32("performance_type").unwrap_or(0);
            let Some(discipline) = Discipline::from_perf_type(raw_type) else {
                debug!(raw_type, "unknown performance type in live command");
                return None;
            };
            Some(PerformanceDelta {
                discipline,
                value: p.i32("value").unwrap_or(0),
            })
        })
        .collect();
    LiveCommand {
        command_id: cmd.u32("command_id").unwrap_or(0),
        command_type: cmd.u32("command_type").unwrap_or(0),
        performance,
        params: params(cmd),
    }
}

fn currencies(perf: RawNode<'_>) -> PerformanceCurrencies {
    PerformanceCurrencies {
        dance: gauge(perf, "dance"),
        passion: gauge(perf, "passion"),
        vocal: gauge(perf, "vocal"),
        visual: gauge(perf, "visual"),
        mental: gauge(perf, "mental"),
    }
}

/// Join evaluations against the roster by position. Unmatched entries are
/// kept with blank card data.
fn partners(chara: RawNode<'_>) -> Vec<PartnerEvaluation> {
    let roster = chara.list("support_card_array").unwrap_or_default();
    chara
        .list("evaluation_info_array")
        .unwrap_or_default()
        .into_iter()
        .map(|entry| {
            let position = entry.u32("training_partner_id").unwrap_or(0);
            let card = roster.iter().find(|card| card.u32("position") == Some(position));
            PartnerEvaluation {
                position,
                support_card_id: card.and_then(|c| c.u32("support_card_id")),
                evaluation: entry.u32("evaluation").unwrap_or(0),
                limit_break: card.and_then(|c| c.u32("limit_break_count")).unwrap_or(0),
                exp: card.and_then(|c| c.u32("exp")).unwrap_or(0),
            }
        })
        .collect()
}
