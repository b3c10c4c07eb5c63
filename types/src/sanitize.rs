//! Terminal text sanitization for log lines.
//!
//! Fetched bodies and error messages come from the network and may carry escape
//! sequences that would move the cursor or rewrite the log pane. Log lines are
//! rendered one per row, so every control character is dropped and tabs become a
//! single space.

use std::borrow::Cow;

const ESC: char = '\x1b';
const BEL: char = '\x07';
const C1_CSI: char = '\u{009b}';

#[derive(Clone, Copy)]
enum State {
    Text,
    /// Saw ESC, deciding which sequence follows.
    Escape,
    /// Inside `ESC [` or C1 CSI, waiting for a final byte.
    Csi,
    /// Inside `ESC ]`, waiting for BEL or `ESC \`.
    Osc,
    /// Saw ESC inside an OSC string.
    OscEscape,
}

/// Strip escape sequences and control characters so `input` renders as one plain row.
///
/// Returns `Cow::Borrowed` when nothing needs removing.
#[must_use]
pub fn sanitize_terminal_text(input: &str) -> Cow<'_, str> {
    if !input.chars().any(|c| c.is_control()) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut state = State::Text;

    for c in input.chars() {
        state = match (state, c) {
            (State::Text, ESC) => State::Escape,
            (State::Text, C1_CSI) => State::Csi,
            (State::Text, '\t') => {
                out.push(' ');
                State::Text
            }
            (State::Text, c) => {
                if !c.is_control() {
                    out.push(c);
                }
                State::Text
            }
            (State::Escape, '[') => State::Csi,
            (State::Escape, ']') => State::Osc,
            // Any other escape is a two-character command.
            (State::Escape, _) => State::Text,
            (State::Csi, '\x40'..='\x7e') => State::Text,
            (State::Csi, '\x20'..='\x3f') => State::Csi,
            // Malformed CSI: drop the introducer, keep going as text.
            (State::Csi, c) => {
                if !c.is_control() {
                    out.push(c);
                }
                State::Text
            }
            (State::Osc, BEL) => State::Text,
            (State::Osc, ESC) => State::OscEscape,
            (State::Osc, _) => State::Osc,
            (State::OscEscape, '\\') => State::Text,
            (State::OscEscape, _) => State::Osc,
        };
    }

    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::sanitize_terminal_text;
    use std::borrow::Cow;

    #[test]
    fn clean_text_is_borrowed() {
        let out = sanitize_terminal_text("<!DOCTYPE html><html lang=\"en\">");
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn strips_csi() {
        assert_eq!(sanitize_terminal_text("a\x1b[2Jb\x1b[31mc"), "abc");
    }

    #[test]
    fn strips_osc_with_bel_and_st() {
        assert_eq!(
            sanitize_terminal_text("x\x1b]52;c;SGVsbG8=\x07y\x1b]8;;http://e\x1b\\z"),
            "xyz"
        );
    }

    #[test]
    fn strips_c1_csi() {
        assert_eq!(sanitize_terminal_text("a\u{009b}2Jb"), "ab");
    }

    #[test]
    fn drops_controls_and_expands_tabs() {
        assert_eq!(sanitize_terminal_text("a\tb\u{7f}c\r\nd\u{0}"), "a bcd");
    }

    #[test]
    fn keeps_unicode() {
        assert_eq!(sanitize_terminal_text("日本\x1b[0m語"), "日本語");
    }
}
