//! # Trackside Core
//!
//! Telemetry normalisation and decision-support engine for a training-game
//! companion. A decoded game snapshot flows through:
//!
//! - [`extract`]: raw snapshot view → [`PartialSessionState`]
//! - [`merge`]: previous [`SessionState`] + partial → new state
//! - [`recommend`]: which live items stay affordable next to the reserved ones
//! - [`turn_to_date`]: turn counter → in-game date, which gates the live pool
//!
//! Everything here is synchronous and pure over in-memory data. Catalogs are
//! loaded once and shared by reference. Malformed game data never errors:
//! it degrades to defaults, `None`, or "unknown" placeholders.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod calendar;
pub mod catalogs;
pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod live;
pub mod metrics;
pub mod session;
pub mod snapshot;
pub mod types;

pub use calendar::{Era, GameDate, Half, turn_to_date};
pub use catalogs::Catalogs;
pub use config::TracksideConfig;
pub use error::{Result, TracksideError};
pub use events::{EventCatalog, EventRule, resolve_choice};
pub use extract::{Extractor, extract};
pub use live::LiveCatalog;
pub use live::recommend::recommend;
pub use metrics::EngineCounters;
pub use session::{PartialSessionState, Reported, SessionState, merge};
pub use snapshot::RawSnapshot;
pub use types::*;
