//! Core engine for awaitprobe.
//!
//! This crate holds the timing probe and the UI-facing [`App`] state, without
//! any terminal dependencies.
//!
//! - [`task`]: [`initiate`] and [`TaskHandle`], which model a suspension point
//!   explicitly.
//! - [`sink`]: ordered destinations for [`LogEntry`] values.
//! - [`probe`]: the four scheduling patterns.
//! - [`app`]: button focus, fire-and-forget presses, and the log pane buffer.

pub mod app;
pub mod probe;
pub mod sink;
pub mod task;

use thiserror::Error;

pub use app::{App, LOG_CAPACITY};
pub use probe::{Probe, ProbeOutcome, handler_context};
pub use sink::{ChannelSink, LogSink, MemorySink, Tee, TracingSink, WriteSink};
pub use task::{TaskHandle, initiate};

// Re-export from crates for public API
pub use probe_config::{ProbeConfig, ProbeSettings};
pub use probe_fetch::{FetchError, Fetcher, HttpFetcher};
pub use probe_types::{LineStyle, LogEntry, Pattern, WorkerId};

/// Failure observed by whoever waits on a probe task.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The continuation task panicked or was cancelled.
    #[error("probe task did not complete: {0}")]
    Join(String),
}
