//! Line structure of a `RopeSlice`, as ropey breaks lines.
//!
//! With the `unicode-lines` feature ropey also breaks on CR, VT, FF, NEL and
//! the Unicode line and paragraph separators, so the chars treated as line
//! endings here follow the same feature.

use ropey::RopeSlice;

/// Whether ropey ends a line at `ch`. CRLF is a single ending made of two
/// chars, both of which count.
#[inline]
pub const fn char_is_line_ending(ch: char) -> bool {
  match ch {
    '\n' => true,
    #[cfg(feature = "unicode-lines")]
    '\u{000B}' | '\u{000C}' | '\r' | '\u{0085}' | '\u{2028}' | '\u{2029}' => true,
    _ => false,
  }
}

/// Length in chars of the ending of `line`, 0 for the last line.
fn line_ending_len(line: &RopeSlice) -> usize {
  let len = line.len_chars();
  let last = |n: usize| len.checked_sub(n).and_then(|idx| line.get_char(idx));
  match last(1) {
    Some('\n') if last(2) == Some('\r') => 2,
    Some(ch) if char_is_line_ending(ch) => 1,
    _ => 0,
  }
}

/// Returns the char index of the end of the given line, not including its line
/// ending.
pub fn line_end_char_index(slice: &RopeSlice, line: usize) -> usize {
  slice.line_to_char(line + 1) - line_ending_len(&slice.line(line))
}

/// The `(start, end)` char bounds of the line holding `pos`, without the line
/// ending. `pos` is clamped to the slice.
pub fn line_bounds(slice: &RopeSlice, pos: usize) -> (usize, usize) {
  let pos = pos.min(slice.len_chars());
  let line = slice.char_to_line(pos);
  (slice.line_to_char(line), line_end_char_index(slice, line))
}
