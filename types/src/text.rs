//! Small pure text helpers.

/// Leading `max` characters of `content` with line breaks removed.
///
/// Line breaks (`\n` and `\r`) are stripped before counting, so any input with at
/// least `max` non-break characters yields exactly `max` characters. Shorter input
/// comes back whole. Counts `char`s, never splits a Unicode scalar value.
#[must_use]
pub fn head(content: &str, max: usize) -> String {
    content
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r'))
        .take(max)
        .collect()
}
