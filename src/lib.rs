//! HTTP latency benchmark.
//!
//! Times repeated probes against a target, streams each sample to a live chart
//! and summarizes the collected latencies through a thread-safe [`SampleStore`].

pub mod chart;
pub mod config;
pub mod driver;
pub mod error;
pub mod probes;
pub mod report;
pub mod stats;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use store::{Record, SampleStore, StatName, Summary, Value};
