//! Replay captured snapshots through the engine and print the result.
//!
//! ```text
//! trackside-replay --config trackside.toml capture-001.msgpack capture-002.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use trackside_core::TracksideConfig;
use trackside_core::metrics::CounterSnapshot;
use trackside_monitor::{IngestOutcome, LivePlan, LivePlanner, Monitor, PublishedState, init_tracing};

#[derive(Parser)]
#[command(name = "trackside-replay")]
#[command(about = "Feed captured game snapshots through the trackside engine", long_about = None)]
struct Cli {
    /// Capture files, applied in order (MessagePack or JSON)
    #[arg(required = true)]
    captures: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Live item ids to reserve before planning
    #[arg(long, value_delimiter = ',')]
    reserve: Vec<u32>,

    /// Preview this live command in the plan
    #[arg(long)]
    hover: Option<u32>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Print counters in Prometheus text format instead of the report
    #[arg(long)]
    prometheus: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    state: &'a PublishedState,
    plan: LivePlan,
    counters: CounterSnapshot,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => TracksideConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TracksideConfig::default(),
    };
    config.logging.json |= cli.json_logs;
    init_tracing(&config.logging);

    let mut monitor = Monitor::from_config(&config)?;
    let mut planner = LivePlanner::from_config(&config.planner);

    for path in &cli.captures {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        match monitor.ingest_bytes(&bytes) {
            Ok(IngestOutcome::Merged { revision, fields }) => {
                tracing::info!(capture = %path.display(), revision, fields, "capture merged");
                planner.sync(&monitor.catalogs().live, monitor.session());
            }
            Ok(outcome) => {
                tracing::info!(capture = %path.display(), ?outcome, "capture ignored");
            }
            Err(e) => {
                tracing::warn!(capture = %path.display(), error = %e, "capture rejected");
            }
        }
    }

    for id in cli.reserve {
        planner.reserve(id);
    }
    planner.hover(cli.hover);

    if cli.prometheus {
        print!("{}", monitor.counters().to_prometheus());
        return Ok(());
    }

    let state = monitor.published();
    let report = Report {
        state: &state,
        plan: planner.plan(&monitor.catalogs().live, &state.session),
        counters: monitor.counters(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
