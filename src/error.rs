//! Error types for the latency benchmark library.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// No stored record carries a numeric value for the requested field.
    #[error("no data available for statistic on field `{field}`")]
    EmptyField { field: String },

    /// Statistics were requested over an empty sample set.
    #[error("cannot compute statistics over zero samples")]
    NoSamples,

    #[error("unknown probe '{name}'. Available probes: {available:?}")]
    UnknownProbe {
        name: String,
        available: Vec<&'static str>,
    },

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for the errors that mean "nothing was measured" rather than a fault.
    pub fn is_empty_field(&self) -> bool {
        matches!(self, Error::EmptyField { .. } | Error::NoSamples)
    }
}
