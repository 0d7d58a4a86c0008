//! Canonical session owner.
//!
//! The [`Monitor`] is the only writer of the [`SessionState`]. Each snapshot
//! runs extract → merge to completion under `&mut self`, so arrivals are
//! serialised by construction. Readers get an immutable
//! [`Arc<PublishedState>`] through a `tokio::sync::watch` channel and never
//! see a half-merged state.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};
use trackside_core::config::TracksideConfig;
use trackside_core::metrics::{CounterSnapshot, EngineCounters};
use trackside_core::{Catalogs, Extractor, RawSnapshot, SessionState, merge};

use crate::decode::decode_snapshot;
use crate::error::{MonitorError, Result};

// ---------------------------------------------------------------------------
// Published state
// ---------------------------------------------------------------------------

/// What readers see: a merged state, stamped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PublishedState {
    /// Bumped whenever a merge adopted at least one field.
    pub revision: u64,
    /// When the snapshot behind this state arrived. `None` before the first
    /// and after a reset.
    pub received_at: Option<DateTime<Utc>>,
    /// The merged session.
    pub session: SessionState,
}

/// What happened to one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// No character block: nothing to merge.
    Skipped,
    /// Extracted, but it reported no fields.
    Unchanged,
    /// Merged and published under this revision.
    Merged {
        /// New revision.
        revision: u64,
        /// Fields the snapshot reported.
        fields: usize,
    },
}

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------

/// Owns the catalogs, the canonical session and the publish channel.
pub struct Monitor {
    catalogs: Arc<Catalogs>,
    session: SessionState,
    revision: u64,
    counters: EngineCounters,
    publisher: watch::Sender<Arc<PublishedState>>,
    max_body_bytes: usize,
    log_choices: bool,
}

impl Monitor {
    /// A monitor over already-loaded catalogs.
    #[must_use]
    pub fn new(catalogs: Arc<Catalogs>, config: &TracksideConfig) -> Self {
        let (publisher, _) = watch::channel(Arc::new(PublishedState::default()));
        Self {
            catalogs,
            session: SessionState::default(),
            revision: 0,
            counters: EngineCounters::new(),
            publisher,
            max_body_bytes: config.ingest.max_body_bytes,
            log_choices: config.logging.log_choice_observations,
        }
    }

    /// Load catalogs as configured and build a monitor.
    ///
    /// # Errors
    /// Returns [`MonitorError::Core`] if a configured catalog cannot be loaded
    /// or `[ingest].listen_addr` is not a socket address.
    pub fn from_config(config: &TracksideConfig) -> Result<Self> {
        let listen_addr = config.ingest.socket_addr()?;
        let catalogs = Catalogs::load(&config.catalogs)?;
        info!(
            %listen_addr,
            max_body_bytes = config.ingest.max_body_bytes,
            "monitor ready"
        );
        Ok(Self::new(Arc::new(catalogs), config))
    }

    /// Decode a wire payload and ingest it.
    ///
    /// # Errors
    /// Returns an error for empty, oversized or undecodable payloads. The
    /// session is left untouched in every error case.
    pub fn ingest_bytes(&mut self, bytes: &[u8]) -> Result<IngestOutcome> {
        EngineCounters::bump(&self.counters.snapshots_received);
        if bytes.len() > self.max_body_bytes {
            EngineCounters::bump(&self.counters.decode_failures);
            return Err(MonitorError::TooLarge {
                size: bytes.len(),
                limit: self.max_body_bytes,
            });
        }
        let raw = decode_snapshot(bytes).inspect_err(|_| {
            EngineCounters::bump(&self.counters.decode_failures);
        })?;
        Ok(self.apply(&raw))
    }

    /// Ingest an already-decoded snapshot.
    pub fn ingest(&mut self, raw: &RawSnapshot) -> IngestOutcome {
        EngineCounters::bump(&self.counters.snapshots_received);
        self.apply(raw)
    }

    fn apply(&mut self, raw: &RawSnapshot) -> IngestOutcome {
        let started = Instant::now();
        let extracted = Extractor::new(&self.catalogs)
            .with_counters(&self.counters)
            .log_choice_observations(self.log_choices)
            .extract(raw);

        let outcome = match extracted {
            None => IngestOutcome::Skipped,
            Some(partial) if partial.is_empty() => {
                debug!("snapshot reported no fields");
                IngestOutcome::Unchanged
            }
            Some(partial) => {
                let fields = partial.fields_present();
                let previous = std::mem::take(&mut self.session);
                self.session = merge(previous, partial);
                self.revision += 1;
                EngineCounters::bump(&self.counters.snapshots_merged);
                self.publish(Some(Utc::now()));
                info!(
                    revision = self.revision,
                    fields,
                    turn = self.session.game_stats.turn,
                    "session updated"
                );
                IngestOutcome::Merged {
                    revision: self.revision,
                    fields,
                }
            }
        };

        let micros = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.counters.last_ingest_micros.store(micros, Ordering::Relaxed);
        outcome
    }

    fn publish(&self, received_at: Option<DateTime<Utc>>) {
        self.publisher.send_replace(Arc::new(PublishedState {
            revision: self.revision,
            received_at,
            session: self.session.clone(),
        }));
    }

    /// A receiver that always holds the latest published state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<PublishedState>> {
        self.publisher.subscribe()
    }

    /// The latest published state.
    #[must_use]
    pub fn published(&self) -> Arc<PublishedState> {
        self.publisher.borrow().clone()
    }

    /// The canonical session.
    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Current revision.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Shared catalogs.
    #[must_use]
    pub fn catalogs(&self) -> &Arc<Catalogs> {
        &self.catalogs
    }

    /// Counter values.
    #[must_use]
    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    /// Forget the session, e.g. when a new run starts.
    pub fn reset(&mut self) {
        self.session = SessionState::default();
        self.revision += 1;
        self.publish(None);
        info!(revision = self.revision, "session reset");
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use trackside_core::Gauge;

    use super::*;

    fn monitor() -> Monitor {
        Monitor::from_config(&TracksideConfig::default()).expect("bundled catalogs")
    }

    fn msgpack(value: &serde_json::Value) -> Vec<u8> {
        rmp_serde::to_vec_named(value).expect("encode")
    }

    #[test]
    fn merged_snapshot_is_published() {
        let mut monitor = monitor();
        let rx = monitor.subscribe();
        let outcome = monitor
            .ingest_bytes(&msgpack(&json!({
                "data": { "chara_info": { "turn": 3, "vital": 80, "max_vital": 100 } }
            })))
            .expect("ingest");
        assert_eq!(outcome, IngestOutcome::Merged { revision: 1, fields: 2 });

        let published = rx.borrow().clone();
        assert_eq!(published.revision, 1);
        assert!(published.received_at.is_some());
        assert_eq!(published.session.stats.vital, Gauge::new(80, 100));
        assert_eq!(monitor.published().revision, 1);
    }

    #[test]
    fn skipped_and_empty_snapshots_do_not_publish() {
        let mut monitor = monitor();
        let rx = monitor.subscribe();
        assert_eq!(
            monitor.ingest(&RawSnapshot::new(json!({ "data": {} }))),
            IngestOutcome::Skipped
        );
        assert_eq!(
            monitor.ingest(&RawSnapshot::new(json!({ "data": { "chara_info": {} } }))),
            IngestOutcome::Unchanged
        );
        assert!(!rx.has_changed().expect("sender alive"));
        assert_eq!(monitor.revision(), 0);

        let counters = monitor.counters();
        assert_eq!(counters.snapshots_received, 2);
        assert_eq!(counters.snapshots_skipped, 1);
        assert_eq!(counters.snapshots_merged, 0);
    }

    #[test]
    fn decode_failures_leave_state_alone() {
        let mut monitor = monitor();
        monitor.ingest(&RawSnapshot::new(json!({ "data": { "chara_info": { "turn": 8 } } })));
        let before = monitor.session().clone();

        assert!(matches!(monitor.ingest_bytes(&[]), Err(MonitorError::EmptyBody)));
        assert!(matches!(monitor.ingest_bytes(&[0xc1]), Err(MonitorError::Decode { .. })));
        assert_eq!(monitor.session(), &before);
        assert_eq!(monitor.counters().decode_failures, 2);
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let mut config = TracksideConfig::default();
        config.ingest.max_body_bytes = 8;
        let catalogs = Arc::new(Catalogs::bundled().expect("bundled"));
        let mut monitor = Monitor::new(catalogs, &config);
        let err = monitor
            .ingest_bytes(br#"{ "data": { "chara_info": {} } }"#)
            .expect_err("too large");
        assert!(matches!(err, MonitorError::TooLarge { limit: 8, .. }));
    }

    #[test]
    fn reset_publishes_an_empty_session() {
        let mut monitor = monitor();
        monitor.ingest(&RawSnapshot::new(json!({ "data": { "chara_info": { "turn": 8 } } })));
        monitor.reset();
        assert_eq!(monitor.revision(), 2);
        assert_eq!(monitor.published().session, SessionState::default());
        assert!(monitor.published().received_at.is_none());
    }

    #[test]
    fn bad_listen_addr_is_a_config_error() {
        let mut config = TracksideConfig::default();
        config.ingest.listen_addr = "localhost".to_string();
        let err = Monitor::from_config(&config).err().expect("rejected");
        assert!(matches!(err, MonitorError::Core(trackside_core::TracksideError::Config(_))));
    }
}
