//! In-memory sample store.
//!
//! Holds the labeled observations collected during one measurement session and
//! answers aggregate statistic queries per field. The store is shared between
//! the measurement tasks and the rendering path as `Arc<SampleStore>`; every
//! operation runs under one lock so callers never observe a half-applied push.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::stats::{compute_statistics, Statistics};

/// A stored observation: field name to numeric value.
pub type Record = BTreeMap<String, f64>;

/// A field value offered to [`SampleStore::push`].
///
/// Numbers are held as `f64`. Integers converted from `i64`, `u64` or `usize`
/// with a magnitude above 2^53 are rounded to the nearest representable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Value {
    /// Returns the value if it can be stored. NaN and infinities are not.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }
}

macro_rules! impl_from_number {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Number(v as f64)
            }
        })*
    };
}

impl_from_number!(f64, f32, i64, i32, u64, u32, usize);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// Name of one statistic in a [`Summary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatName {
    Min,
    Median,
    Max,
    #[serde(rename = "Standard Deviation")]
    StdDev,
}

impl StatName {
    pub fn label(&self) -> &'static str {
        match self {
            StatName::Min => "Min",
            StatName::Median => "Median",
            StatName::Max => "Max",
            StatName::StdDev => "Standard Deviation",
        }
    }
}

impl fmt::Display for StatName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Snapshot of the statistics for one field, in Min, Median, Max, Standard
/// Deviation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    field: String,
    stats: Vec<(StatName, f64)>,
}

impl Summary {
    fn from_statistics(field: &str, stats: &Statistics) -> Self {
        Self {
            field: field.to_string(),
            stats: vec![
                (StatName::Min, stats.min),
                (StatName::Median, stats.median),
                (StatName::Max, stats.max),
                (StatName::StdDev, stats.std),
            ],
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn get(&self, name: StatName) -> Option<f64> {
        self.stats.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatName, f64)> + '_ {
        self.stats.iter().copied()
    }
}

/// Append-only collection of numeric records.
#[derive(Debug, Default)]
pub struct SampleStore {
    records: Mutex<Vec<Record>>,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the numeric entries of `record`. Non-numeric entries are dropped;
    /// a record left with no entries is still stored.
    pub fn push<K, V, I>(&self, record: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let filtered: Record = record
            .into_iter()
            .filter_map(|(k, v)| v.into().as_number().map(|n| (k.into(), n)))
            .collect();

        if filtered.is_empty() {
            tracing::debug!("storing record with no numeric fields");
        }

        self.records.lock().push(filtered);
    }

    /// Returns a copy of every stored record in insertion order.
    pub fn show(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Values of `field` across all records that carry it.
    pub fn values(&self, field: &str) -> Vec<f64> {
        self.records
            .lock()
            .iter()
            .filter_map(|r| r.get(field).copied())
            .collect()
    }

    /// Min, median, max and population standard deviation of `field`.
    pub fn summarize(&self, field: &str) -> Result<Summary> {
        let stats = self.statistics(field)?;
        Ok(Summary::from_statistics(field, &stats))
    }

    /// Full statistics of `field`, including mean and tail percentiles.
    pub fn statistics(&self, field: &str) -> Result<Statistics> {
        let values = self.values(field);
        if values.is_empty() {
            return Err(Error::EmptyField {
                field: field.to_string(),
            });
        }
        compute_statistics(&values)
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}
