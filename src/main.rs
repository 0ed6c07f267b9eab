use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use sched_sim::config::{EngineKind, PolicyKind, SimConfig};
use sched_sim::report::{Summary, Timeline};
use sched_sim::sim::{Pacing, simulate};
use sched_sim::workload::{bernoulli_jobs, load_jobs};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Fcfs,
    Sjf,
    Rr,
    Priority,
}

impl From<PolicyArg> for PolicyKind {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Fcfs => PolicyKind::Fcfs,
            PolicyArg::Sjf => PolicyKind::Sjf,
            PolicyArg::Rr => PolicyKind::RoundRobin,
            PolicyArg::Priority => PolicyKind::Priority,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EngineArg {
    Sequential,
    Pool,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Sequential => EngineKind::Sequential,
            EngineArg::Pool => EngineKind::Pool,
        }
    }
}

/// sched_sim: compare CPU scheduling policies on one or more simulated cores.
///
/// Jobs come from a file (`id arrival burst [priority]` per line) or, when no
/// file is given, from a seeded Bernoulli arrival generator.
#[derive(Debug, Parser)]
#[clap(name = "sched_sim", version)]
struct Opts {
    /// Scheduling policy.
    #[clap(short = 'p', long, value_enum, default_value = "fcfs")]
    policy: PolicyArg,

    /// Time slice for round robin and aging priority.
    #[clap(short = 'q', long, default_value = "2.0")]
    quantum: f64,

    /// Enable priority aging with this step per passed-over dispatch.
    #[clap(short = 'a', long)]
    aging: Option<i64>,

    /// Number of simulated cores.
    #[clap(short = 'c', long, default_value = "1")]
    cores: usize,

    /// Force an engine. Defaults to sequential for one core, pool otherwise.
    #[clap(short = 'e', long, value_enum)]
    engine: Option<EngineArg>,

    /// Job list file.
    #[clap(short = 'j', long)]
    jobs: Option<PathBuf>,

    /// Generator: number of ticks over which jobs may arrive.
    #[clap(long, default_value = "50")]
    ticks: u64,

    /// Generator: per-tick arrival probability.
    #[clap(long, default_value = "0.3")]
    p_arrival: f64,

    /// Generator: probability that an arriving job is short.
    #[clap(long, default_value = "0.3")]
    p_short: f64,

    /// Generator: RNG seed.
    #[clap(short = 's', long, default_value = "0")]
    seed: u64,

    /// Pace the worker pool in real time, milliseconds per simulated unit.
    #[clap(long)]
    pace_ms: Option<u64>,

    /// Print every dispatch after the summary.
    #[clap(short = 't', long, action = clap::ArgAction::SetTrue)]
    timeline: bool,

    /// Enable verbose output. Specify multiple times to increase verbosity.
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    let llv = match opts.verbose {
        0 => simplelog::LevelFilter::Info,
        1 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };
    let mut lcfg = simplelog::ConfigBuilder::new();
    lcfg.set_time_level(simplelog::LevelFilter::Error)
        .set_location_level(simplelog::LevelFilter::Off)
        .set_target_level(simplelog::LevelFilter::Off)
        .set_thread_level(simplelog::LevelFilter::Off);
    simplelog::TermLogger::init(
        llv,
        lcfg.build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let jobs = match &opts.jobs {
        Some(path) => load_jobs(path)
            .with_context(|| format!("Failed to load jobs from {}", path.display()))?,
        None => {
            info!(
                "Generating jobs over {} ticks (seed {})",
                opts.ticks, opts.seed
            );
            bernoulli_jobs(opts.ticks, opts.p_arrival, opts.p_short, 2.0, 6.0, opts.seed)
        }
    };

    let mut config = SimConfig::new(opts.policy.into())
        .with_cores(opts.cores)
        .with_quantum(opts.quantum);
    if let Some(step) = opts.aging {
        config = config.with_aging(step);
    }
    if let Some(engine) = opts.engine {
        config = config.with_engine(engine.into());
    }
    if let Some(ms) = opts.pace_ms {
        config = config.with_pacing(Pacing::RealTime {
            per_unit: Duration::from_millis(ms),
        });
    }

    let result = simulate(&config, jobs).context("Simulation failed")?;

    print!("{}", Summary::new(&result));
    if opts.timeline {
        println!();
        print!("{}", Timeline::new(&result));
    }
    Ok(())
}
