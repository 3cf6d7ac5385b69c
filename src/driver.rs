//! Measurement loop.
//!
//! Invokes the probe once per iteration, times it in milliseconds and, for the
//! timed phase, pushes `{iteration, time}` into the store and the live chart.
//! Failed iterations are counted and logged but never recorded.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::chart::ChartSink;
use crate::probes::{Probe, ProbeOutcome};
use crate::store::{Record, SampleStore};

pub const ITERATION_FIELD: &str = "iteration";
pub const TIME_FIELD: &str = "time";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Warmup,
    Timed,
}

/// Outcome counts of one driver run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs_f64")]
    pub elapsed: Duration,
}

impl RunSummary {
    /// Completed iterations per second, successful or not.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            (self.succeeded + self.failed) as f64 / secs
        } else {
            0.0
        }
    }
}

fn as_secs_f64<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Result of timing one probe invocation.
enum Iteration {
    Success { iteration: usize, millis: f64 },
    Failure { iteration: usize, reason: String },
}

pub struct Driver {
    probe: Arc<dyn Probe>,
    store: Arc<SampleStore>,
    chart: Option<ChartSink>,
    timeout: Duration,
    concurrency: usize,
    pause: Duration,
}

impl Driver {
    pub fn new(probe: Arc<dyn Probe>, store: Arc<SampleStore>) -> Self {
        Self {
            probe,
            store,
            chart: None,
            timeout: Duration::from_secs(10),
            concurrency: 1,
            pause: Duration::ZERO,
        }
    }

    pub fn with_chart(mut self, chart: ChartSink) -> Self {
        self.chart = Some(chart);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Run `iterations` probes, numbered from 1.
    pub async fn run(&self, iterations: usize, phase: Phase) -> RunSummary {
        let start = Instant::now();
        let mut succeeded = 0;
        let mut failed = 0;

        let mut results = stream::iter(1..=iterations)
            .map(|iteration| self.time_probe(iteration))
            .buffer_unordered(self.concurrency);

        while let Some(result) = results.next().await {
            match result {
                Iteration::Success { iteration, millis } => {
                    succeeded += 1;
                    if phase == Phase::Timed {
                        self.record(iteration, millis);
                    }
                }
                Iteration::Failure { iteration, reason } => {
                    failed += 1;
                    tracing::warn!(iteration, ?phase, "probe failed: {}", reason);
                }
            }
        }

        let summary = RunSummary {
            succeeded,
            failed,
            elapsed: start.elapsed(),
        };
        tracing::info!(
            ?phase,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "run complete"
        );
        summary
    }

    async fn time_probe(&self, iteration: usize) -> Iteration {
        if !self.pause.is_zero() && iteration > 1 {
            tokio::time::sleep(self.pause).await;
        }

        let start = Instant::now();
        let result = tokio::time::timeout(self.timeout, self.probe.probe()).await;
        let millis = start.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(Ok(ProbeOutcome::Success)) => Iteration::Success { iteration, millis },
            Ok(Ok(ProbeOutcome::Failure(reason))) => Iteration::Failure { iteration, reason },
            Ok(Err(e)) => Iteration::Failure {
                iteration,
                reason: format!("{:#}", e),
            },
            Err(_) => Iteration::Failure {
                iteration,
                reason: format!("timed out after {:?}", self.timeout),
            },
        }
    }

    fn record(&self, iteration: usize, millis: f64) {
        let mut record = Record::new();
        record.insert(ITERATION_FIELD.to_string(), iteration as f64);
        record.insert(TIME_FIELD.to_string(), millis);

        if let Some(chart) = &self.chart {
            chart.append(&record);
        }
        self.store.push(record);
    }
}
