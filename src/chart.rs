//! Live terminal chart fed by the measurement loop.
//!
//! Points travel over a bounded channel to a render thread that draws a
//! sparkline of the most recent values into a progress bar. Appending never
//! blocks: when the channel is full the point is dropped from the chart (the
//! store still has it) and counted.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::store::Record;

const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const CHANNEL_CAPACITY: usize = 1024;

/// Cloneable handle used by producers to append points to the chart.
#[derive(Clone)]
pub struct ChartSink {
    tx: Sender<Record>,
    dropped: Arc<AtomicUsize>,
}

impl ChartSink {
    pub fn append(&self, record: &Record) {
        match self.tx.try_send(record.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

/// A chart rendering on its own thread.
pub struct LiveChart {
    sink: ChartSink,
    handle: JoinHandle<usize>,
}

impl LiveChart {
    /// Spawn a chart drawing to stderr.
    pub fn spawn(total: usize, field: &str, width: usize) -> Self {
        let pb = ProgressBar::new(total as u64);
        Self::spawn_with(pb, CHANNEL_CAPACITY, field, width)
    }

    /// Spawn a chart that renders nowhere; used when output is not a terminal.
    pub fn hidden(total: usize, field: &str, width: usize) -> Self {
        let pb = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::hidden());
        Self::spawn_with(pb, CHANNEL_CAPACITY, field, width)
    }

    fn spawn_with(pb: ProgressBar, capacity: usize, field: &str, width: usize) -> Self {
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  Timed  [{bar:30}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let (tx, rx) = bounded(capacity);
        let field = field.to_string();
        let width = width.max(1);
        let handle = std::thread::spawn(move || render_loop(rx, pb, &field, width));

        Self {
            sink: ChartSink {
                tx,
                dropped: Arc::new(AtomicUsize::new(0)),
            },
            handle,
        }
    }

    pub fn sink(&self) -> ChartSink {
        self.sink.clone()
    }

    /// Points that could not be queued for rendering.
    pub fn dropped(&self) -> usize {
        self.sink.dropped.load(Ordering::Relaxed)
    }

    /// Close the chart and wait for the render thread. Returns the number of
    /// points drawn. Sinks cloned from this chart must be dropped first.
    pub fn finish(self) -> anyhow::Result<usize> {
        let LiveChart { sink, handle } = self;
        drop(sink);
        handle
            .join()
            .map_err(|_| anyhow::anyhow!("Chart thread panicked"))
    }
}

fn render_loop(rx: Receiver<Record>, pb: ProgressBar, field: &str, width: usize) -> usize {
    let mut window: VecDeque<f64> = VecDeque::with_capacity(width);
    let mut drawn = 0;

    for record in rx.iter() {
        drawn += 1;
        pb.inc(1);
        let Some(value) = record.get(field).copied() else {
            continue;
        };
        if window.len() == width {
            window.pop_front();
        }
        window.push_back(value);
        pb.set_message(format!("{} {}={:.2}", sparkline(&window), field, value));
    }

    pb.finish();
    drawn
}

/// Renders values as a row of block characters scaled between their min and max.
pub fn sparkline<'a>(values: impl IntoIterator<Item = &'a f64>) -> String {
    let values: Vec<f64> = values.into_iter().copied().collect();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    values
        .iter()
        .map(|v| {
            if span <= f64::EPSILON {
                SPARKS[0]
            } else {
                let level = ((v - min) / span * (SPARKS.len() - 1) as f64).round() as usize;
                SPARKS[level.min(SPARKS.len() - 1)]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(iteration: usize, time: f64) -> Record {
        let mut record = Record::new();
        record.insert("iteration".to_string(), iteration as f64);
        record.insert("time".to_string(), time);
        record
    }

    #[test]
    fn test_sparkline_scales() {
        assert_eq!(sparkline(&[1.0, 8.0]), "▁█");
        assert_eq!(sparkline(&[3.0, 3.0, 3.0]), "▁▁▁");
        assert_eq!(sparkline(&[]), "");
    }

    #[test]
    fn test_chart_draws_every_point() {
        let chart = LiveChart::hidden(3, "time", 10);
        let sink = chart.sink();
        for i in 1..=3 {
            sink.append(&point(i, i as f64));
        }
        drop(sink);

        assert_eq!(chart.dropped(), 0);
        assert_eq!(chart.finish().unwrap(), 3);
    }

    #[test]
    fn test_append_never_blocks_when_full() {
        // Capacity 1 and a render thread that may lag: appends must still return.
        let pb = ProgressBar::hidden();
        let chart = LiveChart::spawn_with(pb, 1, "time", 4);
        let sink = chart.sink();
        for i in 0..1_000 {
            sink.append(&point(i, 1.0));
        }
        drop(sink);

        let dropped = chart.dropped();
        let drawn = chart.finish().unwrap();
        assert_eq!(drawn + dropped, 1_000);
    }
}
