//! Command-line configuration.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Latency benchmark configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "http-latency-benchmark")]
#[command(about = "Time repeated requests against a target and summarize their latency")]
pub struct Config {
    /// Target to probe (URL for http/head, host:port for tcp)
    #[arg(short, long, default_value = "https://example.com")]
    pub target: String,

    /// Probe to use
    #[arg(short, long, default_value = "http")]
    pub probe: String,

    /// Number of timed iterations
    #[arg(short = 'n', long, default_value_t = 20)]
    pub iterations: usize,

    /// Number of warmup iterations (not recorded)
    #[arg(long, default_value_t = 0)]
    pub warmup_iterations: usize,

    /// Maximum probes in flight at once
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// Per-probe timeout in milliseconds
    #[arg(long, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Pause between iterations in milliseconds
    #[arg(long, default_value_t = 0)]
    pub pause_ms: u64,

    /// HTTP status treated as success (default: any 2xx)
    #[arg(long)]
    pub expect_status: Option<u16>,

    /// Field to summarize after the run
    #[arg(long, default_value = "time")]
    pub field: String,

    /// Decimal places in the printed summary
    #[arg(long, default_value_t = 2)]
    pub precision: usize,

    /// Number of recent samples shown in the live chart
    #[arg(long, default_value_t = 40)]
    pub chart_width: usize,

    /// Disable the live chart
    #[arg(long, default_value_t = false)]
    pub no_chart: bool,

    /// Write the results as JSON to this path
    #[arg(long)]
    pub json: Option<PathBuf>,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::InvalidConfig("iterations must be at least 1".into()));
        }
        if self.concurrency == 0 {
            return Err(Error::InvalidConfig("concurrency must be at least 1".into()));
        }
        if self.timeout_ms == 0 {
            return Err(Error::InvalidConfig("timeout must be positive".into()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::parse_from(["http-latency-benchmark"])
    }
}
