//! HTTP Latency Benchmark
//!
//! Times repeated probes against a target and summarizes their latency.
//!
//! Supports:
//! - HTTP GET (default)
//! - HTTP HEAD
//! - TCP connect

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use http_latency::chart::LiveChart;
use http_latency::driver::{Driver, Phase};
use http_latency::probes::create_registry;
use http_latency::report::{self, BenchmarkReport};
use http_latency::{Config, Error, SampleStore};

extern crate jemallocator;

#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

const UNIT: &str = "ms";

fn banner(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{}", title);
    println!("{}", "=".repeat(60));
}

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::parse();
    config.validate()?;

    let registry = create_registry();
    let kind = registry.get(&config.probe).ok_or_else(|| Error::UnknownProbe {
        name: config.probe.clone(),
        available: registry.available(),
    })?;

    println!("{}", "=".repeat(60));
    println!("HTTP Latency Benchmark");
    println!("{}", "=".repeat(60));
    println!("\nConfiguration:");
    println!("  Target: {}", config.target);
    println!("  Probe: {} ({})", kind.name(), kind.description());
    println!("  Iterations: {} (+ {} warmup)", config.iterations, config.warmup_iterations);
    println!("  Concurrency: {}", config.concurrency);
    println!("  Timeout: {} ms", config.timeout_ms);
    if config.pause_ms > 0 {
        println!("  Pause: {} ms", config.pause_ms);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    // Step 1: Open probe
    banner("Step 1: Opening Probe");
    let probe = kind
        .open(&config.target, &config)
        .with_context(|| format!("Failed to open {} probe for {}", kind.name(), config.target))?;
    println!("  Ready");

    let store = Arc::new(SampleStore::new());
    let driver = Driver::new(probe, store.clone())
        .with_timeout(config.timeout())
        .with_concurrency(config.concurrency)
        .with_pause(config.pause());

    // Step 2: Warmup phase
    if config.warmup_iterations > 0 {
        banner("Step 2: Warmup Phase");
        println!("\nExecuting {} probes...", config.warmup_iterations);
        let warmup = runtime.block_on(driver.run(config.warmup_iterations, Phase::Warmup));
        println!(
            "  Done in {:.2}s ({} ok, {} failed)",
            warmup.elapsed.as_secs_f64(),
            warmup.succeeded,
            warmup.failed
        );
    }

    // Step 3: Timed phase
    banner("Step 3: Timed Phase");
    println!("\nExecuting {} probes...", config.iterations);
    let chart = (!config.no_chart)
        .then(|| LiveChart::spawn(config.iterations, &config.field, config.chart_width));
    let driver = match &chart {
        Some(chart) => driver.with_chart(chart.sink()),
        None => driver,
    };
    let run = runtime.block_on(driver.run(config.iterations, Phase::Timed));
    // Releases the chart sink so the render thread can finish.
    drop(driver);

    if let Some(chart) = chart {
        let dropped = chart.dropped();
        let drawn = chart.finish()?;
        if dropped > 0 {
            tracing::warn!(drawn, dropped, "chart fell behind; some points were not drawn");
        }
    }

    // Step 4: Results
    banner("BENCHMARK RESULTS");

    let text = report::render(store.summarize(&config.field), &config.field, UNIT, config.precision)?;
    println!();
    print!("{}", text);

    let statistics = store.statistics(&config.field).ok();
    if let Some(stats) = &statistics {
        println!("  {:20} {:>12.*}", "Mean:", config.precision, stats.mean);
        println!("  {:20} {:>12.*}", "p95:", config.precision, stats.p95);
        println!("  {:20} {:>12.*}", "p99:", config.precision, stats.p99);
    }

    println!("\nSucceeded: {}", run.succeeded);
    println!("Failed: {}", run.failed);
    println!("Throughput: {:.2} probes/sec", run.throughput());

    if let Some(path) = &config.json {
        let report = BenchmarkReport {
            target: config.target.clone(),
            probe: kind.name().to_string(),
            iterations: config.iterations,
            warmup_iterations: config.warmup_iterations,
            concurrency: config.concurrency,
            field: config.field.clone(),
            unit: UNIT.to_string(),
            throughput: run.throughput(),
            run: run.clone(),
            summary: store.summarize(&config.field).ok(),
            statistics,
        };
        report
            .write_json(path)
            .with_context(|| format!("Failed to write results to {}", path.display()))?;
        println!("Results written to {}", path.display());
    }

    banner("Benchmark Complete!");

    if run.succeeded == 0 {
        anyhow::bail!("All {} probes failed", run.failed);
    }

    Ok(())
}
