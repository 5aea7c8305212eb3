//! Diagnostic sinks for backend console output.
//!
//! Backends report informational lines and warnings through a
//! [`DiagnosticSink`] injected at construction. [`TracingSink`] forwards to
//! `tracing`, [`CaptureSink`] keeps the lines for later inspection.

use std::sync::{Mutex, MutexGuard};

/// Observer for backend diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// Informational output.
    fn message(&self, line: &str);

    /// Warning or error output.
    fn warning(&self, line: &str);
}

/// Forwards diagnostics to `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn message(&self, line: &str) {
        tracing::debug!(target: "bayes_evidence::backend", "{line}");
    }

    fn warning(&self, line: &str) {
        tracing::warn!(target: "bayes_evidence::backend", "{line}");
    }
}

/// Records diagnostics in memory.
///
/// ```rust
/// use bayes_evidence::backend::{CaptureSink, DiagnosticSink};
///
/// let sink = CaptureSink::new();
/// sink.warning("slow convergence");
/// assert_eq!(sink.warnings(), vec!["slow convergence".to_string()]);
/// assert!(sink.messages().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct CaptureSink {
    messages: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
}

fn guard(lines: &Mutex<Vec<String>>) -> MutexGuard<'_, Vec<String>> {
    lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl CaptureSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Informational lines recorded so far.
    pub fn messages(&self) -> Vec<String> {
        guard(&self.messages).clone()
    }

    /// Warning lines recorded so far.
    pub fn warnings(&self) -> Vec<String> {
        guard(&self.warnings).clone()
    }

    /// Drops everything recorded.
    pub fn clear(&self) {
        guard(&self.messages).clear();
        guard(&self.warnings).clear();
    }
}

impl DiagnosticSink for CaptureSink {
    fn message(&self, line: &str) {
        guard(&self.messages).push(line.to_string());
    }

    fn warning(&self, line: &str) {
        guard(&self.warnings).push(line.to_string());
    }
}
