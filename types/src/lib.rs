//! Core domain types for awaitprobe.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod entry;
mod pattern;
mod sanitize;
mod text;

pub use entry::{LineStyle, LogEntry, WorkerId};
pub use pattern::{Pattern, UnknownPatternError};
pub use sanitize::sanitize_terminal_text;
pub use text::head;

/// Probe-point messages shared by every pattern.
///
/// Truncated fetch results and failures are the only messages not listed here.
pub mod messages {
    pub const BEGIN: &str = "Begin";
    pub const AWAITING: &str = "awaiting...";
    pub const AFTER_CALL: &str = "After call";
    pub const AFTER_SLEEP: &str = "After Sleep";
    pub const FAILED_PREFIX: &str = "Failed: ";
}
