//! # halsim harness
//!
//! Builds a simulation context from configuration, optionally runs a TOML
//! scenario against it and dumps the resulting state as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Run a scenario with the default config path
//! halsim --scenario scenarios/bump.toml
//!
//! # Explicit config, JSON snapshot to a file
//! halsim --config config/halsim.toml --scenario scenarios/bump.toml --dump state.json
//!
//! # Snapshot to stdout, verbose JSON logs
//! halsim --dump - -v --json
//! ```

use clap::Parser;
use halsim::{ContextSnapshot, Scenario, ScenarioReport, SimContext};
use halsim_common::prelude::*;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// halsim - simulated HAL device-state registry harness
#[derive(Parser, Debug)]
#[command(name = "halsim")]
#[command(version)]
#[command(about = "Drive and inspect a simulated HAL device registry")]
#[command(long_about = None)]
struct Args {
    /// Path to the registry configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Scenario file to run.
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Write a JSON snapshot here after the scenario ("-" for stdout).
    #[arg(short, long, value_name = "FILE")]
    dump: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Dump<'a> {
    report: Option<&'a ScenarioReport>,
    state: ContextSnapshot,
}

fn main() {
    if let Err(e) = run() {
        error!("halsim failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(&args.config);
    let level = config
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, level);
    let config = config?;
    if !args.config.exists() {
        warn!("No config at {}, using defaults", args.config.display());
    }

    info!("halsim v{} starting...", env!("CARGO_PKG_VERSION"));
    let ctx = SimContext::new(&config)?;

    let report = match &args.scenario {
        Some(path) => {
            info!("Running scenario {}", path.display());
            let scenario = Scenario::load(path)?;
            Some(scenario.run(&ctx)?)
        }
        None => None,
    };

    if let Some(path) = &args.dump {
        let dump = Dump {
            report: report.as_ref(),
            state: ctx.snapshot(),
        };
        write_dump(path, &dump)?;
    }

    info!("halsim done");
    Ok(())
}

/// Load the configuration, falling back to defaults when the default path
/// does not exist.
fn load_config(path: &Path) -> Result<SimConfig, ConfigError> {
    match SimConfig::load(path) {
        Err(ConfigError::FileNotFound) if path == Path::new(DEFAULT_CONFIG_PATH) => {
            Ok(SimConfig::default())
        }
        other => other,
    }
}

fn write_dump(path: &Path, dump: &Dump<'_>) -> Result<(), Box<dyn std::error::Error>> {
    if path == Path::new("-") {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        serde_json::to_writer_pretty(&mut out, dump)?;
        writeln!(out)?;
    } else {
        let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
        serde_json::to_writer_pretty(&mut out, dump)?;
        out.flush()?;
        info!("Snapshot written to {}", path.display());
    }
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
///
/// `RUST_LOG` wins over everything; otherwise `--verbose` selects debug and
/// the configured level applies.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
