//! Non-fatal diagnostics emitted while normalizing options.
//!
//! Bad input never aborts a call. It is replaced by a default and reported
//! through a [`DiagnosticSink`], which the client owner can swap out.

use compact_str::CompactString;
use std::sync::Mutex;
use tracing::warn;

/// A recoverable anomaly found in caller input
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Warning {
    /// Key is not part of the platform whitelist and was dropped
    #[error("Unknown property: {0}")]
    UnknownProperty(CompactString),

    /// Id could not be read as a number and fell back to the default
    #[error("Id is not a number: {0}")]
    InvalidId(String),

    /// Badge could not be read as a number and fell back to the default
    #[error("Badge number is not a number: {0}")]
    InvalidBadge(String),

    /// Trigger time could not be read as a number and fell back to now
    #[error("Trigger time is not a number: {0}")]
    InvalidTimestamp(String),

    /// Configured default override names a key the platform does not have
    #[error("Unknown default property: {0}")]
    UnknownDefault(CompactString),

    /// Configured numeric default could not be read as a number and was ignored
    #[error("Default for {0} is not a number: {1}")]
    InvalidDefault(CompactString, String),
}

/// Receiver for normalization warnings
pub trait DiagnosticSink: Send + Sync {
    fn warn(&self, warning: Warning);
}

/// Default sink, logs every warning through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&self, warning: Warning) {
        warn!("⚠️ {}", warning);
    }
}

/// Sink that keeps warnings in memory, mostly for tests and dry runs
#[derive(Debug, Default)]
pub struct CollectingSink {
    warnings: Mutex<Vec<Warning>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all warnings recorded so far
    pub fn warnings(&self) -> Vec<Warning> {
        self.lock().clone()
    }

    /// Removes and returns all recorded warnings
    pub fn take(&self) -> Vec<Warning> {
        std::mem::take(&mut *self.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Warning>> {
        self.warnings.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DiagnosticSink for CollectingSink {
    fn warn(&self, warning: Warning) {
        self.lock().push(warning);
    }
}
