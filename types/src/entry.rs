//! Log entries emitted at probe points.

use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local};

static NEXT_WORKER: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static WORKER: Cell<Option<WorkerId>> = const { Cell::new(None) };
}

/// Small process-unique identifier for the OS thread that ran a probe point.
///
/// Assigned lazily, in order of first use, so the first thread to log is `T1`.
/// Purely observational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(u64);

impl WorkerId {
    #[must_use]
    pub fn current() -> Self {
        WORKER.with(|slot| {
            if let Some(id) = slot.get() {
                return id;
            }
            let id = WorkerId(NEXT_WORKER.fetch_add(1, Ordering::Relaxed));
            slot.set(Some(id));
            id
        })
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// How a [`LogEntry`] is rendered as a text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStyle {
    pub show_worker: bool,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self { show_worker: true }
    }
}

/// One line of the diagnostic log.
///
/// Immutable once built: fields are private and only exposed by accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    at: DateTime<Local>,
    elapsed: Duration,
    worker: WorkerId,
    context: &'static str,
    message: String,
}

impl LogEntry {
    #[must_use]
    pub fn new(
        at: DateTime<Local>,
        elapsed: Duration,
        worker: WorkerId,
        context: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            at,
            elapsed,
            worker,
            context,
            message: message.into(),
        }
    }

    /// Wall-clock time of the probe point.
    #[must_use]
    pub fn at(&self) -> DateTime<Local> {
        self.at
    }

    /// Monotonic offset from the start of the probe invocation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[must_use]
    pub fn worker(&self) -> WorkerId {
        self.worker
    }

    /// Name of the function that emitted the entry.
    #[must_use]
    pub fn context(&self) -> &'static str {
        self.context
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// `<ss.fff> / T<id> / <context>() / <message>`, without the worker segment when
    /// `style.show_worker` is false.
    #[must_use]
    pub fn line(&self, style: LineStyle) -> String {
        let stamp = self.at.format("%S%.3f");
        if style.show_worker {
            format!(
                "{stamp} / {} / {}() / {}",
                self.worker, self.context, self.message
            )
        } else {
            format!("{stamp} / {}() / {}", self.context, self.message)
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line(LineStyle::default()))
    }
}
