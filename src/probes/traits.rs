//! Probe trait definitions.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Config;

/// What a single probe invocation reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success,
    Failure(String),
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success)
    }
}

/// A probe bound to one target. Invoked once per iteration.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Perform one request. Only `Ok(ProbeOutcome::Success)` counts as success.
    async fn probe(&self) -> Result<ProbeOutcome>;
}

/// A kind of probe that can be opened against a target.
pub trait ProbeKind: Send + Sync {
    /// Returns the name of this probe kind.
    fn name(&self) -> &'static str;

    /// One-line description shown in the configuration banner.
    fn description(&self) -> &'static str;

    /// Build a probe for the given target.
    fn open(&self, target: &str, config: &Config) -> Result<Arc<dyn Probe>>;
}

/// Registry of available probe kinds.
pub struct ProbeRegistry {
    kinds: Vec<Arc<dyn ProbeKind>>,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self { kinds: Vec::new() }
    }

    pub fn register(&mut self, kind: Arc<dyn ProbeKind>) {
        self.kinds.push(kind);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ProbeKind>> {
        self.kinds.iter().find(|k| k.name() == name).cloned()
    }

    pub fn available(&self) -> Vec<&'static str> {
        self.kinds.iter().map(|k| k.name()).collect()
    }
}

impl Default for ProbeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
