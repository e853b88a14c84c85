//! Configuration types for throttled-du
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Experiment configuration with validation

use crate::error::ConfigError;
use crate::scheduler::Cancellation;
use clap::Parser;
use std::path::PathBuf;

/// Maximum concurrency limit accepted from the command line
pub const MAX_CONCURRENCY: usize = 65_536;

/// Disk usage with a bounded number of concurrent filesystem operations
#[derive(Parser, Debug, Clone)]
#[command(
    name = "throttled-du",
    version,
    about = "Disk usage with a bounded number of concurrent filesystem operations",
    long_about = "Recursively measures the size of a directory tree while capping how many \
                  stat/readdir calls are in flight at once.\n\n\
                  Run several limits to compare wall-clock throughput at each concurrency level.",
    after_help = "EXAMPLES:\n    \
        throttled-du /data\n    \
        throttled-du /data -c 1 -c 4 -c 16 -c 0 -r 3\n    \
        throttled-du /mnt/hdd -c 1 -c 64 --format csv > results.csv"
)]
pub struct CliArgs {
    /// Directory to measure
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Concurrency limit to test (repeatable, 0 = unbounded)
    #[arg(
        short = 'c',
        long = "concurrency",
        value_name = "NUM",
        action = clap::ArgAction::Append,
        default_value = "0"
    )]
    pub limits: Vec<usize>,

    /// Runs per concurrency limit
    #[arg(short = 'r', long, default_value = "1", value_name = "NUM")]
    pub runs: usize,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
    pub format: ReportFormat,

    /// Behavior of in-flight work after the first error
    #[arg(long, value_enum, default_value_t = CancellationArg::Drain)]
    pub cancellation: CancellationArg,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (log every completed work item)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Output format for run reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// Human-readable table
    Table,
    /// Comma-separated values, one line per run
    Csv,
    /// JSON array, one object per run
    Json,
}

/// `--cancellation` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CancellationArg {
    /// Wait for in-flight work before reporting the error
    Drain,
    /// Report the error immediately
    BestEffort,
}

impl From<CancellationArg> for Cancellation {
    fn from(arg: CancellationArg) -> Self {
        match arg {
            CancellationArg::Drain => Cancellation::Drain,
            CancellationArg::BestEffort => Cancellation::BestEffort,
        }
    }
}

/// Validated experiment configuration
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Absolute root path
    pub root: PathBuf,

    /// Concurrency limits, in the order given
    pub limits: Vec<usize>,

    /// Runs per limit
    pub runs: usize,

    pub format: ReportFormat,

    pub cancellation: Cancellation,

    /// Show progress spinner
    pub show_progress: bool,

    /// Log every completed work item
    pub verbose: bool,
}

impl ExperimentConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if args.limits.is_empty() {
            return Err(ConfigError::NoLimits);
        }

        if let Some(&limit) = args.limits.iter().find(|&&l| l > MAX_CONCURRENCY) {
            return Err(ConfigError::InvalidLimit {
                limit,
                max: MAX_CONCURRENCY,
            });
        }

        if args.runs == 0 {
            return Err(ConfigError::InvalidRuns { runs: args.runs });
        }

        let root = std::path::absolute(&args.path).map_err(|e| ConfigError::InvalidRoot {
            path: args.path.clone(),
            reason: e.to_string(),
        })?;

        // CSV and JSON go to stdout for redirection; keep the spinner off it
        let show_progress = !args.quiet && args.format == ReportFormat::Table;

        Ok(Self {
            root,
            limits: args.limits,
            runs: args.runs,
            format: args.format,
            cancellation: args.cancellation.into(),
            show_progress,
            verbose: args.verbose,
        })
    }

    /// Every (limit, run number) pair, in execution order
    pub fn schedule(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.limits
            .iter()
            .flat_map(move |&limit| (1..=self.runs).map(move |run| (limit, run)))
    }
}
