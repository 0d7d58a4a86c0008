//! Engine counters.
//!
//! Lock-free `AtomicU64` counters bumped on the ingest path and read when a
//! dashboard or the replay tool asks for them. Exportable as Prometheus text.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic counters for the ingest path.
pub struct EngineCounters {
    /// Snapshots handed to the engine.
    pub snapshots_received: AtomicU64,
    /// Snapshots skipped because they carried no character block.
    pub snapshots_skipped: AtomicU64,
    /// Snapshots that were extracted and merged.
    pub snapshots_merged: AtomicU64,
    /// Payloads that could not be decoded at all.
    pub decode_failures: AtomicU64,
    /// Narrative events with no catalogued rule.
    pub unknown_events: AtomicU64,
    /// Observed choices with no catalogued outcome.
    pub unknown_choices: AtomicU64,
    /// Wall time of the most recent extract + merge, in microseconds.
    pub last_ingest_micros: AtomicU64,
}

impl EngineCounters {
    /// Zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            snapshots_received: AtomicU64::new(0),
            snapshots_skipped: AtomicU64::new(0),
            snapshots_merged: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
            unknown_events: AtomicU64::new(0),
            unknown_choices: AtomicU64::new(0),
            last_ingest_micros: AtomicU64::new(0),
        }
    }

    /// Increment a counter by one.
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            snapshots_received: self.snapshots_received.load(Ordering::Relaxed),
            snapshots_skipped: self.snapshots_skipped.load(Ordering::Relaxed),
            snapshots_merged: self.snapshots_merged.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            unknown_events: self.unknown_events.load(Ordering::Relaxed),
            unknown_choices: self.unknown_choices.load(Ordering::Relaxed),
            last_ingest_micros: self.last_ingest_micros.load(Ordering::Relaxed),
        }
    }
}

impl Default for EngineCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter values at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    /// Snapshots handed to the engine.
    pub snapshots_received: u64,
    /// Snapshots without a character block.
    pub snapshots_skipped: u64,
    /// Snapshots extracted and merged.
    pub snapshots_merged: u64,
    /// Undecodable payloads.
    pub decode_failures: u64,
    /// Events with no catalogued rule.
    pub unknown_events: u64,
    /// Choices with no catalogued outcome.
    pub unknown_choices: u64,
    /// Duration of the latest ingest, in microseconds.
    pub last_ingest_micros: u64,
}

impl CounterSnapshot {
    /// Format as Prometheus-compatible text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP trackside_snapshots_received_total Snapshots handed to the engine\n\
             # TYPE trackside_snapshots_received_total counter\n\
             trackside_snapshots_received_total {}\n\
             # HELP trackside_snapshots_skipped_total Snapshots without a character block\n\
             # TYPE trackside_snapshots_skipped_total counter\n\
             trackside_snapshots_skipped_total {}\n\
             # HELP trackside_snapshots_merged_total Snapshots extracted and merged\n\
             # TYPE trackside_snapshots_merged_total counter\n\
             trackside_snapshots_merged_total {}\n\
             # HELP trackside_decode_failures_total Undecodable payloads\n\
             # TYPE trackside_decode_failures_total counter\n\
             trackside_decode_failures_total {}\n\
             # HELP trackside_unknown_events_total Narrative events with no catalogued rule\n\
             # TYPE trackside_unknown_events_total counter\n\
             trackside_unknown_events_total {}\n\
             # HELP trackside_unknown_choices_total Observed choices with no catalogued outcome\n\
             # TYPE trackside_unknown_choices_total counter\n\
             trackside_unknown_choices_total {}\n\
             # HELP trackside_last_ingest_microseconds Duration of the latest extract and merge\n\
             # TYPE trackside_last_ingest_microseconds gauge\n\
             trackside_last_ingest_microseconds {}\n",
            self.snapshots_received,
            self.snapshots_skipped,
            self.snapshots_merged,
            self.decode_failures,
            self.unknown_events,
            self.unknown_choices,
            self.last_ingest_micros,
        )
    }
}
