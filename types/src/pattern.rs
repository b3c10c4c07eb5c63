//! The four scheduling patterns exposed as buttons.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A scheduling pattern the probe can demonstrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Await the fetch directly in the handler.
    Simple,
    /// Delegate the fetch to a helper and await its handle.
    Await,
    /// Helper fetches first, then blocks.
    AwaitSleep,
    /// Helper blocks first, then fetches.
    SleepAwait,
}

#[derive(Debug, Error)]
#[error("unknown pattern `{0}` (expected one of: simple, await, await-sleep, sleep-await)")]
pub struct UnknownPatternError(pub String);

impl Pattern {
    pub const ALL: [Pattern; 4] = [
        Pattern::Simple,
        Pattern::Await,
        Pattern::AwaitSleep,
        Pattern::SleepAwait,
    ];

    /// Button caption.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Pattern::Simple => "Simple",
            Pattern::Await => "Await",
            Pattern::AwaitSleep => "AwaitSleep",
            Pattern::SleepAwait => "SleepAwait",
        }
    }

    /// Name accepted on the command line.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Pattern::Simple => "simple",
            Pattern::Await => "await",
            Pattern::AwaitSleep => "await-sleep",
            Pattern::SleepAwait => "sleep-await",
        }
    }

    #[must_use]
    pub const fn hotkey(self) -> char {
        match self {
            Pattern::Simple => '1',
            Pattern::Await => '2',
            Pattern::AwaitSleep => '3',
            Pattern::SleepAwait => '4',
        }
    }

    #[must_use]
    pub fn from_hotkey(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.hotkey() == c)
    }

    /// Short description shown under the buttons.
    #[must_use]
    pub const fn summary(self) -> &'static str {
        match self {
            Pattern::Simple => "await the fetch in the handler itself",
            Pattern::Await => "call a helper that awaits; handle returns at once",
            Pattern::AwaitSleep => "helper awaits then blocks; the wait absorbs the delay",
            Pattern::SleepAwait => "helper blocks then awaits; the call absorbs the delay",
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        let idx = self.index();
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    #[must_use]
    pub fn prev(self) -> Self {
        let idx = self.index();
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Pattern::Simple => 0,
            Pattern::Await => 1,
            Pattern::AwaitSleep => 2,
            Pattern::SleepAwait => 3,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Pattern {
    type Err = UnknownPatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|p| p.slug() == needle || p.label().eq_ignore_ascii_case(&needle))
            .ok_or_else(|| UnknownPatternError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::Pattern;

    #[test]
    fn parses_slugs_and_labels() {
        assert_eq!("simple".parse::<Pattern>().unwrap(), Pattern::Simple);
        assert_eq!("await-sleep".parse::<Pattern>().unwrap(), Pattern::AwaitSleep);
        assert_eq!("sleep_await".parse::<Pattern>().unwrap(), Pattern::SleepAwait);
        assert_eq!("AwaitSleep".parse::<Pattern>().unwrap(), Pattern::AwaitSleep);
        assert_eq!(" Await ".parse::<Pattern>().unwrap(), Pattern::Await);
    }

    #[test]
    fn rejects_unknown() {
        let err = "sleepy".parse::<Pattern>().unwrap_err();
        assert!(err.to_string().contains("sleepy"));
    }

    #[test]
    fn focus_cycles_in_both_directions() {
        assert_eq!(Pattern::SleepAwait.next(), Pattern::Simple);
        assert_eq!(Pattern::Simple.prev(), Pattern::SleepAwait);
        for p in Pattern::ALL {
            assert_eq!(p.next().prev(), p);
        }
    }

    #[test]
    fn hotkeys_round_trip() {
        for p in Pattern::ALL {
            assert_eq!(Pattern::from_hotkey(p.hotkey()), Some(p));
        }
        assert_eq!(Pattern::from_hotkey('9'), None);
    }
}
