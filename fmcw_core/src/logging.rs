// fmcw_core/src/logging.rs

//! Injected logging for sensor instances.
//!
//! The model never touches global logging state. It talks to a `Logger`,
//! which owns a handle to a `LogSink` chosen by the host, the instance name,
//! the on/off switch and the set of enabled categories.

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

/// Well-known log categories.
pub mod category {
    /// Configuration derivation and validation.
    pub const CONFIG: &str = "Config";
    /// Per-step summaries and step-level anomalies.
    pub const STEP: &str = "Step";
    /// Per-beam detail. Noisy, disabled by default.
    pub const TRACE: &str = "Trace";
}

/// Receives pre-formatted log messages tagged with a category.
pub trait LogSink: Debug + Send + Sync {
    fn log(&self, instance: &str, category: &str, message: &str);
}

// =========================================================================
// == Sinks ==
// =========================================================================

/// Forwards records to `tracing`, so the host's subscriber decides where they go.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, instance: &str, category: &str, message: &str) {
        match category {
            category::CONFIG => tracing::warn!(target: "fmcw_core", instance, category, "{message}"),
            category::TRACE => tracing::trace!(target: "fmcw_core", instance, category, "{message}"),
            _ => tracing::info!(target: "fmcw_core", instance, category, "{message}"),
        }
    }
}

/// One buffered record of a `MemorySink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub instance: String,
    pub category: String,
    pub message: String,
}

/// Buffers records in memory, for hosts that forward them later and for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of everything logged so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn records_in(&self, category: &str) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.category == category)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn log(&self, instance: &str, category: &str, message: &str) {
        // A poisoned buffer only loses diagnostics, never the step.
        if let Ok(mut records) = self.records.lock() {
            records.push(LogRecord {
                instance: instance.to_owned(),
                category: category.to_owned(),
                message: message.to_owned(),
            });
        }
    }
}

// =========================================================================
// == Logger ==
// =========================================================================

/// The per-instance logging handle.
#[derive(Debug, Clone)]
pub struct Logger {
    instance_name: String,
    enabled: bool,
    categories: BTreeSet<String>,
    sink: Arc<dyn LogSink>,
}

impl Logger {
    /// A logger with the `Config` and `Step` categories enabled.
    pub fn new(instance_name: impl Into<String>, sink: Arc<dyn LogSink>, enabled: bool) -> Self {
        Self {
            instance_name: instance_name.into(),
            enabled,
            categories: [category::CONFIG, category::STEP]
                .into_iter()
                .map(String::from)
                .collect(),
            sink,
        }
    }

    /// A logger that drops everything.
    pub fn disabled() -> Self {
        Self::new("", Arc::new(TracingSink), false)
    }

    /// Replaces the enabled category set.
    pub fn with_categories<'a>(mut self, categories: impl IntoIterator<Item = &'a str>) -> Self {
        self.categories = categories.into_iter().map(String::from).collect();
        self
    }

    pub fn enable_category(&mut self, category: &str) {
        self.categories.insert(category.to_owned());
    }

    pub fn is_enabled(&self, category: &str) -> bool {
        self.enabled && self.categories.contains(category)
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    pub fn log(&self, category: &str, message: impl AsRef<str>) {
        if self.is_enabled(category) {
            self.sink
                .log(&self.instance_name, category, message.as_ref());
        }
    }
}
