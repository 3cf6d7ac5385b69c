//! Presentation of benchmark results.

use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::driver::RunSummary;
use crate::error::Result;
use crate::stats::Statistics;
use crate::store::Summary;

/// Formats a summary as aligned `label: value unit` lines.
pub fn format_summary(summary: &Summary, unit: &str, precision: usize) -> String {
    let mut out = format!("Statistics for `{}` ({}):\n", summary.field(), unit);
    for (name, value) in summary.iter() {
        let label = format!("{}:", name);
        let _ = writeln!(out, "  {:20} {:>12.*}", label, precision, value);
    }
    out
}

pub fn format_empty(field: &str) -> String {
    format!("no data available for statistic on field `{}`\n", field)
}

/// Renders the outcome of `SampleStore::summarize`. An empty field becomes a
/// readable message; any other error is returned.
pub fn render(result: Result<Summary>, field: &str, unit: &str, precision: usize) -> Result<String> {
    match result {
        Ok(summary) => Ok(format_summary(&summary, unit, precision)),
        Err(e) if e.is_empty_field() => Ok(format_empty(field)),
        Err(e) => Err(e),
    }
}

/// Machine-readable results of one benchmark session.
#[derive(Debug, Serialize)]
pub struct BenchmarkReport {
    pub target: String,
    pub probe: String,
    pub iterations: usize,
    pub warmup_iterations: usize,
    pub concurrency: usize,
    pub field: String,
    pub unit: String,
    pub run: RunSummary,
    pub throughput: f64,
    pub summary: Option<Summary>,
    pub statistics: Option<Statistics>,
}

impl BenchmarkReport {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}
