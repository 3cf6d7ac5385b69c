//! Statistics computation for benchmark samples.

use serde::Serialize;

use crate::error::{Error, Result};

/// Aggregate statistics over one set of samples.
///
/// Standard deviation uses the population convention: the squared deviations
/// are divided by `n`, not `n - 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub p95: f64,
    pub p99: f64,
}

pub fn compute_statistics(samples: &[f64]) -> Result<Statistics> {
    if samples.is_empty() {
        return Err(Error::NoSamples);
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    let (mean, std) = mean_and_std(samples, min, max);
    let median = median_of_sorted(&sorted);
    let p95 = percentile_of_sorted(&sorted, 0.95);
    let p99 = percentile_of_sorted(&sorted, 0.99);

    Ok(Statistics {
        count: sorted.len(),
        mean,
        std,
        min,
        max,
        median,
        p95,
        p99,
    })
}

fn mean_and_std(samples: &[f64], min: f64, max: f64) -> (f64, f64) {
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    if mean.is_finite() && variance.is_finite() {
        return (mean, variance.sqrt());
    }

    // Sums overflowed: redo the computation on samples scaled into [-1, 1].
    let scale = min.abs().max(max.abs());
    let scaled_mean = samples.iter().map(|x| x / scale).sum::<f64>() / n;
    let scaled_variance = samples
        .iter()
        .map(|x| (x / scale - scaled_mean).powi(2))
        .sum::<f64>()
        / n;

    // Neither can exceed the largest magnitude, so clamping only absorbs rounding.
    let mean = (scaled_mean * scale).clamp(min, max);
    let std = scaled_variance.sqrt().min(1.0) * scale;
    (mean, std)
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        return sorted[mid];
    }

    let (a, b) = (sorted[mid - 1], sorted[mid]);
    if (a < 0.0) == (b < 0.0) {
        // Same sign: b - a cannot overflow, a + b might.
        (a + (b - a) / 2.0).clamp(a, b)
    } else {
        (a + b) / 2.0
    }
}

// Nearest rank, clamped so q close to 1.0 stays in bounds.
fn percentile_of_sorted(sorted: &[f64], q: f64) -> f64 {
    let idx = (sorted.len() as f64 * q) as usize;
    sorted[idx.min(sorted.len() - 1)]
}
