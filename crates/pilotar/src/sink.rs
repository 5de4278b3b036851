//! Narration sink for scenario runs.
//!
//! Each step emits at least one human-readable line before acting
//! ("searching for known game", "installing it"); the sink is where those
//! lines go. Purely observational, append-only.

use std::sync::{Arc, Mutex};

/// Append-only narration channel.
pub trait LogSink {
    /// Append one narration line.
    fn log(&mut self, message: &str);
}

/// Sink that forwards narration to the `tracing` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&mut self, message: &str) {
        tracing::info!(target: "pilotar::scenario", "{message}");
    }
}

/// Sink that records narration for later inspection.
///
/// Clones share the underlying buffer, so a test can keep one clone and
/// hand the other to a dispatcher.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the narration recorded so far, oldest first.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl LogSink for MemorySink {
    fn log(&mut self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
    }
}
