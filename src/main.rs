//! throttled-du - Disk Usage with Bounded I/O Concurrency
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use throttled_du::config::{CliArgs, ExperimentConfig, ReportFormat};
use throttled_du::output::{print_table, write_csv, write_json, RunRecord};
use throttled_du::progress::{limit_label, print_header, ProgressReporter};
use throttled_du::scheduler::{Scheduler, TracingObserver, WorkKind, WorkObserver};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = ExperimentConfig::from_args(args).context("Invalid configuration")?;

    if config.show_progress {
        print_header(&config.root, &config.limits, config.runs);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    let records = runtime.block_on(run_experiment(&config))?;

    match config.format {
        ReportFormat::Table => print_table(&records),
        ReportFormat::Csv => {
            let stdout = std::io::stdout();
            write_csv(&mut stdout.lock(), &records).context("Failed to write CSV")?;
        }
        ReportFormat::Json => {
            let stdout = std::io::stdout();
            write_json(&mut stdout.lock(), &records).context("Failed to write JSON")?;
        }
    }

    Ok(())
}

/// Run every (limit, run) pair sequentially; the first failure aborts
async fn run_experiment(config: &ExperimentConfig) -> Result<Vec<RunRecord>> {
    let mut records = Vec::new();

    for (limit, run) in config.schedule() {
        let progress = config
            .show_progress
            .then(|| ProgressReporter::new(limit, run));

        let observer = RunObserver {
            progress: progress.clone(),
            verbose: config.verbose,
        };

        let result = Scheduler::new(config.root.clone(), limit)
            .cancellation(config.cancellation)
            .observer(observer)
            .run()
            .await;

        if let Some(p) = &progress {
            p.finish_and_clear();
        }

        let report = result.with_context(|| {
            format!("Scan failed (limit {}, run {})", limit_label(limit), run)
        })?;

        info!(
            limit = limit,
            run = run,
            files = report.files,
            duration_ms = report.duration().as_millis() as u64,
            "Run finished"
        );

        records.push(RunRecord { run, report });
    }

    Ok(records)
}

/// Feeds the spinner and, with --verbose, the debug log
struct RunObserver {
    progress: Option<ProgressReporter>,
    verbose: bool,
}

impl WorkObserver for RunObserver {
    fn on_complete(&self, kind: WorkKind, path: &Path, info: &str) {
        if let Some(p) = &self.progress {
            p.on_complete(kind, path, info);
        }
        if self.verbose {
            TracingObserver.on_complete(kind, path, info);
        }
    }
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("throttled_du=debug,warn")
    } else {
        EnvFilter::new("throttled_du=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
