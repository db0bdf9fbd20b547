//! L2 prefetcher trace replay CLI.
//!
//! This binary replays a recorded L2 access trace through one detector. It performs:
//! 1. **Configuration:** Built-in defaults, optionally overridden by a JSON file and flags.
//! 2. **Replay:** Drives the detector against the deterministic host model.
//! 3. **Reporting:** Prints statistics, and optionally the full issue log as text or JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use pfsim_core::common::error::{ConfigError, TraceError};
use pfsim_core::config::{Config, PrefetcherKind};
use pfsim_core::prefetch;
use pfsim_core::sim::trace::load_trace;
use pfsim_core::sim::{HostModel, Replay, ReplayReport};

#[derive(Parser, Debug)]
#[command(
    name = "pfsim",
    author,
    version,
    about = "Replay an L2 access trace through a prefetcher",
    long_about = "Replay an L2 access trace through one prefetch decision engine.\n\nTrace lines are `<cycle> <addr> <ip> <hit>` (decimal or 0x-hex).\n\nExamples:\n  pfsim traces/stream.trace\n  pfsim traces/mcf.trace --prefetcher stride --warmup 100000\n  pfsim traces/mcf.trace --config ampm.json --issues --json"
)]
struct Cli {
    /// Trace file to replay.
    trace: PathBuf,

    /// JSON configuration file (defaults are used for omitted fields).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Detector to run; overrides the configuration file.
    #[arg(short, long, value_enum)]
    prefetcher: Option<Kind>,

    /// Number of leading accesses treated as warmup.
    #[arg(long, default_value_t = 0)]
    warmup: usize,

    /// Emit a stats heartbeat every N accesses (0 disables).
    #[arg(long, default_value_t = 0)]
    heartbeat: usize,

    /// Cycles an MSHR stays occupied.
    #[arg(long, default_value_t = HostModel::default().fill_latency)]
    fill_latency: u64,

    /// Cycles a read queue slot stays occupied.
    #[arg(long, default_value_t = HostModel::default().queue_latency)]
    queue_latency: u64,

    /// Print every issue attempt.
    #[arg(long)]
    issues: bool,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    /// AMPM-lite access map pattern matching.
    Ampm,
    /// IP-indexed stride.
    Stride,
    /// Confidence-gated stream.
    Stream,
}

impl From<Kind> for PrefetcherKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Ampm => Self::Ampm,
            Kind::Stride => Self::IpStride,
            Kind::Stream => Self::Stream,
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Trace(#[from] TraceError),
    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON shape of the report; the issue log is included only with `--issues`.
#[derive(Serialize)]
struct JsonReport<'a> {
    detector: &'a str,
    final_cycle: u64,
    stats: &'a pfsim_core::stats::PrefetchStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    issues: Option<&'a [pfsim_core::sim::IssueRecord]>,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Loads config and trace, replays, and prints the report.
fn run(cli: &Cli) -> Result<(), CliError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(kind) = cli.prefetcher {
        config.prefetcher = kind.into();
    }

    let trace = load_trace(&cli.trace)?;
    tracing::info!(
        trace = %cli.trace.display(),
        records = trace.len(),
        prefetcher = ?config.prefetcher,
        "replaying trace"
    );

    let model = HostModel {
        fill_latency: cli.fill_latency,
        queue_latency: cli.queue_latency,
        ..HostModel::default()
    };
    let mut prefetcher = prefetch::build(&config)?;
    let report = Replay::new(model)
        .with_warmup(cli.warmup)
        .with_heartbeat(cli.heartbeat)
        .run(prefetcher.as_mut(), &trace);

    if cli.json {
        print_json(&report, cli.issues)
    } else {
        print_text(&report, cli.issues);
        Ok(())
    }
}

fn print_json(report: &ReplayReport, with_issues: bool) -> Result<(), CliError> {
    let json = JsonReport {
        detector: report.detector,
        final_cycle: report.final_cycle,
        stats: &report.stats,
        issues: with_issues.then_some(report.issues.as_slice()),
    };
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn print_text(report: &ReplayReport, with_issues: bool) {
    if with_issues {
        for issue in &report.issues {
            println!(
                "{:>12} base={:#014x} target={:#014x} fill={:<3} {}",
                issue.cycle,
                issue.base_addr,
                issue.target_addr,
                issue.fill,
                if issue.accepted { "accepted" } else { "rejected" }
            );
        }
    }
    println!("final cycle: {}", report.final_cycle);
    report.stats.print(report.detector);
}
