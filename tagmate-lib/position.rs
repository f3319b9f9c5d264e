use ropey::RopeSlice;
use tagmate_core::line_ending::line_end_char_index;

/// A point in a text buffer as (row, column), both 0-indexed and counted in
/// chars.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
  pub row: usize,
  pub col: usize,
}

impl Position {
  pub fn new(row: usize, col: usize) -> Self {
    Self { row, col }
  }
}

impl From<(usize, usize)> for Position {
  fn from(tuple: (usize, usize)) -> Self {
    Position {
      row: tuple.0,
      col: tuple.1,
    }
  }
}

/// Convert a char index to a [`Position`]. `pos` is clamped to the text.
pub fn coords_at_pos(text: RopeSlice, pos: usize) -> Position {
  let pos = pos.min(text.len_chars());
  let row = text.char_to_line(pos);
  let col = pos - text.line_to_char(row);
  Position::new(row, col)
}

/// Convert a [`Position`] to a char index.
///
/// Rows past the end of the text resolve to the end of the text. Columns past
/// the end of a line resolve to the end of that line, before its line ending.
pub fn char_idx_at_coords(text: RopeSlice, coords: Position) -> usize {
  if coords.row >= text.len_lines() {
    return text.len_chars();
  }
  let line_start = text.line_to_char(coords.row);
  let line_end = line_end_char_index(&text, coords.row);
  line_start.saturating_add(coords.col).min(line_end)
}

#[cfg(test)]
mod test {
  use ropey::Rope;

  use super::*;

  #[test]
  fn test_coords_at_pos() {
    let text = Rope::from("<p>\n  hello\nwörld");
    let slice = text.slice(..);
    assert_eq!(coords_at_pos(slice, 0), (0, 0).into());
    assert_eq!(coords_at_pos(slice, 3), (0, 3).into());
    assert_eq!(coords_at_pos(slice, 4), (1, 0).into());
    assert_eq!(coords_at_pos(slice, 9), (1, 5).into());
    assert_eq!(coords_at_pos(slice, 13), (2, 1).into());
    assert_eq!(coords_at_pos(slice, 100), (2, 5).into());
  }

  #[test]
  fn test_char_idx_at_coords() {
    let text = Rope::from("<p>\n  hello\nwörld");
    let slice = text.slice(..);
    assert_eq!(char_idx_at_coords(slice, (0, 0).into()), 0);
    assert_eq!(char_idx_at_coords(slice, (1, 2).into()), 6);
    assert_eq!(char_idx_at_coords(slice, (2, 2).into()), 14);
    // Past the end of a line.
    assert_eq!(char_idx_at_coords(slice, (0, 10).into()), 3);
    assert_eq!(char_idx_at_coords(slice, (1, usize::MAX).into()), 11);
    // Past the end of the text.
    assert_eq!(char_idx_at_coords(slice, (9, 0).into()), 17);
  }
}
