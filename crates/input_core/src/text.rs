//! UTF-8 helpers for caret handling in single-line fields.

use std::borrow::Cow;

/// Clamp a byte index to the nearest char boundary at or before it.
///
/// ```
/// use input_core::clamp_to_char_boundary;
///
/// let s = "Zoë!"; // 'ë' is 2 bytes
/// assert_eq!(clamp_to_char_boundary(s, 3), 2);
/// assert_eq!(clamp_to_char_boundary(s, 99), s.len());
/// ```
#[inline]
pub fn clamp_to_char_boundary(s: &str, index: usize) -> usize {
    let mut index = index.min(s.len());
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Byte index of the char boundary before `i` (0 at the start).
pub fn prev_cursor_boundary(s: &str, i: usize) -> usize {
    let i = clamp_to_char_boundary(s, i);
    s[..i].char_indices().next_back().map_or(0, |(idx, _)| idx)
}

/// Byte index of the char boundary after `i` (`s.len()` at the end).
pub fn next_cursor_boundary(s: &str, i: usize) -> usize {
    let i = clamp_to_char_boundary(s, i);
    s[i..].chars().next().map_or(s.len(), |c| i + c.len_utf8())
}

/// Strip CR and LF so pasted text stays on one line.
///
/// ```
/// use input_core::filter_single_line;
///
/// assert_eq!(filter_single_line("Ban\r\nana"), "Banana");
/// ```
pub fn filter_single_line(s: &str) -> Cow<'_, str> {
    if !s.contains(['\n', '\r']) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.chars().filter(|c| !matches!(c, '\n' | '\r')).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_step_over_multibyte_chars() {
        let s = "aé€";
        assert_eq!(next_cursor_boundary(s, 0), 1);
        assert_eq!(next_cursor_boundary(s, 1), 3);
        assert_eq!(next_cursor_boundary(s, 3), 6);
        assert_eq!(next_cursor_boundary(s, 6), 6);

        assert_eq!(prev_cursor_boundary(s, 6), 3);
        assert_eq!(prev_cursor_boundary(s, 3), 1);
        assert_eq!(prev_cursor_boundary(s, 1), 0);
        assert_eq!(prev_cursor_boundary(s, 0), 0);
    }

    #[test]
    fn mid_char_indices_snap_backwards() {
        let s = "a€";
        assert_eq!(clamp_to_char_boundary(s, 2), 1);
        assert_eq!(prev_cursor_boundary(s, 3), 1);
        assert_eq!(next_cursor_boundary(s, 2), 4);
    }

    #[test]
    fn single_line_filter_borrows_when_clean() {
        assert!(matches!(filter_single_line("plain"), Cow::Borrowed(_)));
        assert_eq!(filter_single_line("\na\rb\n"), "ab");
    }
}
