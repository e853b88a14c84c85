//! Report rendering for experiment runs
//!
//! Each run yields one [`Report`]; runs are printed as a styled table, as
//! CSV lines suitable for redirecting into a spreadsheet, or as JSON.

use crate::progress::limit_label;
use crate::scheduler::Report;
use console::style;
use humansize::{format_size, BINARY};
use serde::Serialize;
use std::io::{self, Write};

/// Header line for CSV output
pub const CSV_HEADER: &str =
    "root,limit,run,files,directories,bytes,max_active,started_at,finished_at,duration_ms";

/// One measured run
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub run: usize,
    #[serde(flatten)]
    pub report: Report,
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Quote a CSV field when it contains a separator, quote, or newline
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render one run as a CSV line (no trailing newline)
pub fn csv_line(record: &RunRecord) -> String {
    let r = &record.report;
    format!(
        "{},{},{},{},{},{},{},{},{},{}",
        csv_field(&r.root.display().to_string()),
        r.limit,
        record.run,
        r.files,
        r.directories,
        r.bytes,
        r.max_active,
        r.started_at.to_rfc3339(),
        r.finished_at.to_rfc3339(),
        r.duration().as_millis(),
    )
}

/// Write the CSV header and one line per run
pub fn write_csv<W: Write>(out: &mut W, records: &[RunRecord]) -> io::Result<()> {
    writeln!(out, "{}", CSV_HEADER)?;
    for record in records {
        writeln!(out, "{}", csv_line(record))?;
    }
    Ok(())
}

/// Write all runs as a pretty-printed JSON array
pub fn write_json<W: Write>(out: &mut W, records: &[RunRecord]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, records)?;
    writeln!(out)
}

/// Print the results table
pub fn print_table(records: &[RunRecord]) {
    println!("{}", style("Runs").green().bold());
    println!("{}", style("─".repeat(86)).dim());
    println!(
        "  {:>9}  {:>3}  {:>12}  {:>10}  {:>11}  {:>6}  {:>9}  {:>10}",
        style("Limit").bold(),
        style("Run").bold(),
        style("Files").bold(),
        style("Dirs").bold(),
        style("Size").bold(),
        style("Peak").bold(),
        style("Time").bold(),
        style("Items/s").bold(),
    );

    for record in records {
        let r = &record.report;
        println!(
            "  {:>9}  {:>3}  {:>12}  {:>10}  {:>11}  {:>6}  {:>8.2}s  {:>10.0}",
            limit_label(r.limit),
            record.run,
            format_number(r.files),
            format_number(r.directories),
            format_size(r.bytes, BINARY),
            r.max_active,
            r.duration().as_secs_f64(),
            r.items_per_second(),
        );
    }
    println!();
}
