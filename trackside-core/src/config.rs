//! Configuration for the trackside engine and monitor.
//!
//! Maps directly to `trackside.toml`. Every field has a default, so an empty
//! file (or no file at all) yields a working setup.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TracksideConfig {
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Catalog asset overrides.
    #[serde(default)]
    pub catalogs: CatalogConfig,
    /// Transport boundary settings.
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Live-item planning behaviour.
    #[serde(default)]
    pub planner: PlannerConfig,
}

impl TracksideConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `TracksideError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::TracksideError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error. `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
    /// Log every raw narrative choice observed, so the event catalog can be extended.
    #[serde(default = "default_true")]
    pub log_choice_observations: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            log_choice_observations: true,
        }
    }
}

/// Optional on-disk replacements for the bundled catalogs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON event rule catalog. Bundled asset when unset.
    #[serde(default)]
    pub events_path: Option<PathBuf>,
    /// JSON live-item catalog. Bundled asset when unset.
    #[serde(default)]
    pub live_items_path: Option<PathBuf>,
}

/// Settings for the transport boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Address the transport layer binds its snapshot listener to. Trackside
    /// never opens the socket itself; [`IngestConfig::socket_addr`] is the
    /// validated form handed to the listener.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Largest snapshot body accepted, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl IngestConfig {
    /// `listen_addr` parsed as a socket address.
    ///
    /// # Errors
    /// Returns `TracksideError::Config` if it is not `ip:port`.
    pub fn socket_addr(&self) -> crate::error::Result<SocketAddr> {
        self.listen_addr.parse().map_err(|e| {
            crate::TracksideError::Config(format!("invalid listen_addr {:?}: {e}", self.listen_addr))
        })
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Live-item planning behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Pre-reserve the heaviest items of the pool whenever the pool changes.
    #[serde(default = "default_true")]
    pub auto_reserve_top_weight: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            auto_reserve_top_weight: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_listen_addr() -> String { "0.0.0.0:4639".to_string() }
fn default_max_body_bytes() -> usize { 50 * 1024 * 1024 }
