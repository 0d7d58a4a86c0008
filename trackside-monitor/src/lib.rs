//! # trackside-monitor: the live side of trackside
//!
//! Wraps the pure engine in `trackside-core` with what a running companion
//! needs:
//!
//! ```text
//!  wire bytes ──► decode ──► RawSnapshot
//!                               │
//!                               ▼
//!                 ┌──────── Monitor ────────┐
//!                 │ extract → merge → bump  │──► watch<Arc<PublishedState>>
//!                 └─────────────────────────┘              │
//!                                                          ▼
//!                                                     LivePlanner
//! ```
//!
//! ## Modules
//!
//! - `decode`: MessagePack (JSON fallback) payloads to raw snapshots
//! - `monitor`: single owner of the canonical session, publishes revisions
//! - `planner`: reservations, hover preview and the live recommendation
//! - `telemetry`: `tracing` subscriber setup from `[logging]`

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod decode;
pub mod error;
pub mod monitor;
pub mod planner;
pub mod telemetry;

pub use decode::decode_snapshot;
pub use error::{MonitorError, Result};
pub use monitor::{IngestOutcome, Monitor, PublishedState};
pub use planner::{LivePlan, LivePlanner};
pub use telemetry::init_tracing;
