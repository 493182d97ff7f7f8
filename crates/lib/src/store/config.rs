//! `StoreConfig`: explicit construction of a `Store`'s tunables.
//!
//! Analogous to the teacher's `BackendConfig` (`crates/bin/src/cli.rs`):
//! a plain struct built through explicit setter methods rather than
//! environment-variable magic. The CLI binary is the only place that wires
//! `clap`'s `env` attribute on top of this.

use std::path::PathBuf;

use crate::fuel::DEFAULT_FUEL;

/// Construction options for a `Store`.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub(crate) path: PathBuf,
    pub(crate) fuel_budget: u64,
    pub(crate) pretty_json: bool,
}

impl StoreConfig {
    /// A config pointing at `path`, with default fuel budget and compact
    /// (non-pretty) on-disk JSON.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            path: path.into(),
            fuel_budget: DEFAULT_FUEL,
            pretty_json: false,
        }
    }

    /// Overrides the per-query fuel budget (spec.md §5, "Cancellation /
    /// timeouts").
    pub fn with_fuel_budget(mut self, budget: u64) -> Self {
        self.fuel_budget = budget;
        self
    }

    /// Serializes the backing file with `serde_json`'s pretty printer
    /// instead of its compact one. Useful for debugging; costs more I/O.
    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}
