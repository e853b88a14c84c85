//! Progress reporting for experiment runs
//!
//! Provides a per-run spinner using indicatif, fed by a [`WorkObserver`].

use crate::scheduler::{WorkKind, WorkObserver};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Spinner counting completed work items for one run
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a spinner labelled with the run being measured
    pub fn new(limit: usize, run: usize) -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg} {pos} items ({per_sec})")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        bar.set_message(format!("limit {} run {}:", limit_label(limit), run));
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Number of completed work items so far
    pub fn items(&self) -> u64 {
        self.bar.position()
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl WorkObserver for ProgressReporter {
    fn on_complete(&self, _kind: WorkKind, _path: &Path, _info: &str) {
        self.bar.inc(1);
    }
}

/// Display form of a concurrency limit
pub fn limit_label(limit: usize) -> String {
    if limit == 0 {
        "unbounded".to_string()
    } else {
        limit.to_string()
    }
}

/// Print a header at the start of the experiment
pub fn print_header(root: &Path, limits: &[usize], runs: usize) {
    let limits: Vec<String> = limits.iter().map(|&l| limit_label(l)).collect();

    println!();
    println!(
        "{} {}",
        style("throttled-du").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Root:").bold(), root.display());
    println!("  {} {}", style("Limits:").bold(), limits.join(", "));
    println!("  {} {}", style("Runs:").bold(), runs);
    println!();
}
