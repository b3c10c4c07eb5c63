//! Destinations for probe log entries.
//!
//! Sinks are called synchronously at the probe point, so entries arrive in the
//! order the probe points executed. Nothing here buffers or reorders.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use probe_types::{LineStyle, LogEntry};
use tokio::sync::mpsc;

/// Append-only consumer of log entries.
pub trait LogSink: Send + Sync {
    fn emit(&self, entry: &LogEntry);
}

/// Writes each entry as one `tracing` event on target `awaitprobe::probe`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    style: LineStyle,
}

impl TracingSink {
    #[must_use]
    pub fn new(style: LineStyle) -> Self {
        Self { style }
    }
}

impl LogSink for TracingSink {
    fn emit(&self, entry: &LogEntry) {
        tracing::info!(
            target: "awaitprobe::probe",
            worker = entry.worker().get(),
            context = entry.context(),
            elapsed_ms = entry.elapsed().as_millis() as u64,
            "{}",
            entry.line(self.style)
        );
    }
}

/// Forwards entries to an unbounded channel (the UI log pane).
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<LogEntry>,
}

impl ChannelSink {
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<LogEntry>) -> Self {
        Self { tx }
    }
}

impl LogSink for ChannelSink {
    fn emit(&self, entry: &LogEntry) {
        // Receiver gone means the UI is shutting down.
        let _ = self.tx.send(entry.clone());
    }
}

/// Keeps every entry in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, entry: &LogEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
    }
}

/// Writes one formatted line per entry and flushes it before returning.
///
/// Headless mode points this at stdout. The first write failure is reported
/// through `tracing`; later ones are only recorded.
pub struct WriteSink<W> {
    style: LineStyle,
    out: Mutex<W>,
    failed: AtomicBool,
}

impl<W: Write + Send> WriteSink<W> {
    #[must_use]
    pub fn new(out: W, style: LineStyle) -> Self {
        Self {
            style,
            out: Mutex::new(out),
            failed: AtomicBool::new(false),
        }
    }

    /// Whether any line could not be written.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }
}

impl<W: Write + Send> LogSink for WriteSink<W> {
    fn emit(&self, entry: &LogEntry) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let written = writeln!(out, "{}", entry.line(self.style)).and_then(|()| out.flush());
        if let Err(err) = written
            && !self.failed.swap(true, Ordering::AcqRel)
        {
            tracing::warn!("Failed to write probe line: {err}");
        }
    }
}

/// Fans out to several sinks, in order.
#[derive(Default, Clone)]
pub struct Tee {
    sinks: Vec<Arc<dyn LogSink>>,
}

impl Tee {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl LogSink for Tee {
    fn emit(&self, entry: &LogEntry) {
        for sink in &self.sinks {
            sink.emit(entry);
        }
    }
}
