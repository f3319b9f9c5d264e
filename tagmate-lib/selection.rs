//! Carets and multi-caret selections.
//!
//! A [`Range`] is a half-open span of char offsets with a direction: `anchor`
//! is where the selection started and `head` is where the caret sits. When
//! `anchor == head` the range is a bare caret.
//!
//! ```text
//! anchor=2, head=7: "he[llo w]orld"  (forward selection)
//! anchor=7, head=2: "he]llo w[orld"  (backward selection)
//! anchor=5, head=5: "hello|world"    (caret)
//! ```
//!
//! A [`Selection`] is one or more ranges, kept sorted by position with
//! overlapping ranges merged. It is never empty.
//!
//! Unlike block-cursor editors, carets here are zero-width insertion points:
//! typing at a caret inserts at `head`, and the char "before the caret" is the
//! char at `head - 1`.

use std::borrow::Cow;

use ropey::RopeSlice;
use smallvec::{
  SmallVec,
  smallvec,
};
use thiserror::Error;

use crate::transaction::{
  Assoc,
  ChangeSet,
  TransactionError,
};

pub type Result<T> = std::result::Result<T, SelectionError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionError {
  #[error("selection must contain at least one range")]
  EmptySelection,
  #[error("range {from}..{to} exceeds text length {len}")]
  RangeExceedsText { from: usize, to: usize, len: usize },
  #[error(transparent)]
  Transaction(#[from] TransactionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
  pub anchor: usize,
  pub head:   usize,
}

impl Range {
  pub fn new(anchor: usize, head: usize) -> Self {
    Self { anchor, head }
  }

  #[inline]
  pub fn point(head: usize) -> Self {
    Self::new(head, head)
  }

  /// Start of the range
  #[inline]
  #[must_use]
  pub fn from(&self) -> usize {
    std::cmp::min(self.anchor, self.head)
  }

  /// End of the range
  #[inline]
  #[must_use]
  pub fn to(&self) -> usize {
    std::cmp::max(self.anchor, self.head)
  }

  #[inline]
  #[must_use]
  pub fn len(&self) -> usize {
    self.to() - self.from()
  }

  /// When the head and anchor are in the same position, we have a caret.
  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.anchor == self.head
  }

  /// Check if two ranges overlap. Carets touching the edge of a selection do
  /// not overlap it, two carets at the same offset do.
  pub fn overlaps(&self, other: &Self) -> bool {
    self.from() == other.from() || (self.to() > other.from() && other.to() > self.from())
  }

  /// Returns a range that covers both inputs, keeping a backward direction
  /// only when both were backward.
  pub fn merge(&self, other: Self) -> Self {
    if self.anchor > self.head && other.anchor > other.head {
      Self::new(self.anchor.max(other.anchor), self.head.min(other.head))
    } else {
      Self::new(self.from().min(other.from()), self.to().max(other.to()))
    }
  }

  /// Fails when the range reaches past `len` chars, which happens when a
  /// host hands over ranges computed against an older version of the text.
  pub fn ensure_within(&self, len: usize) -> Result<()> {
    if self.to() > len {
      return Err(SelectionError::RangeExceedsText {
        from: self.from(),
        to: self.to(),
        len,
      });
    }
    Ok(())
  }

  /// Map a range through a set of changes.
  ///
  /// Carets follow insertions made exactly at their position, which is what
  /// typing needs. Selections keep their edges outside of insertions made at
  /// those edges.
  pub fn map(mut self, changes: &ChangeSet) -> Result<Self> {
    use std::cmp::Ordering;
    if changes.is_empty() {
      return Ok(self);
    }

    let (anchor_assoc, head_assoc) = match self.anchor.cmp(&self.head) {
      Ordering::Equal => (Assoc::After, Assoc::After),
      Ordering::Less => (Assoc::After, Assoc::Before),
      Ordering::Greater => (Assoc::Before, Assoc::After),
    };

    self.anchor = changes.map_pos(self.anchor, anchor_assoc)?;
    self.head = changes.map_pos(self.head, head_assoc)?;
    Ok(self)
  }

  /// Returns the text inside this range. Borrowed when the range lies in a
  /// single rope chunk.
  #[inline]
  pub fn fragment<'a, 'b: 'a>(&'a self, text: RopeSlice<'b>) -> Cow<'b, str> {
    self.slice(text).into()
  }

  #[inline]
  pub fn slice<'a, 'b: 'a>(&'a self, text: RopeSlice<'b>) -> RopeSlice<'b> {
    text.slice(self.from()..self.to())
  }
}

/// A selection is one or more ranges.
/// INVARIANT: A selection can never be empty (always contain at least one
/// range).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
  ranges: SmallVec<[Range; 1]>,
}

impl Selection {
  pub fn new(ranges: SmallVec<[Range; 1]>) -> Result<Self> {
    if ranges.is_empty() {
      return Err(SelectionError::EmptySelection);
    }
    Ok(Self { ranges }.normalize())
  }

  pub fn point(pos: usize) -> Self {
    Self {
      ranges: smallvec![Range::point(pos)],
    }
  }

  #[must_use]
  /// Constructs a selection holding a single range.
  pub fn single(anchor: usize, head: usize) -> Self {
    Self {
      ranges: smallvec![Range::new(anchor, head)],
    }
  }

  /// Builds a selection of bare carets.
  pub fn carets(positions: impl IntoIterator<Item = usize>) -> Result<Self> {
    Self::new(positions.into_iter().map(Range::point).collect())
  }

  pub fn ranges(&self) -> &[Range] {
    &self.ranges
  }

  /// The first range in document order.
  pub fn first(&self) -> Range {
    self.ranges[0]
  }

  /// Number of ranges (not their total length).
  #[inline]
  #[must_use]
  pub fn count(&self) -> usize {
    self.ranges.len()
  }

  /// Check if every range is a bare caret.
  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.ranges.iter().all(Range::is_empty)
  }

  /// Map selections over a set of changes.
  pub fn map(mut self, changes: &ChangeSet) -> Result<Self> {
    if changes.is_empty() {
      return Ok(self);
    }
    for range in self.ranges.iter_mut() {
      *range = range.map(changes)?;
    }
    Ok(self.normalize())
  }

  /// Ranges are sorted by [Range::from] with overlapping ranges merged.
  fn normalize(mut self) -> Self {
    if self.ranges.len() < 2 {
      return self;
    }
    self.ranges.sort_by_key(Range::from);

    let mut ranges: SmallVec<[Range; 1]> = SmallVec::with_capacity(self.ranges.len());
    for range in self.ranges.drain(..) {
      if let Some(prev_range) = ranges.last_mut() {
        if prev_range.overlaps(&range) {
          *prev_range = prev_range.merge(range);
          continue;
        }
      }
      ranges.push(range);
    }

    self.ranges = ranges;
    self
  }

  #[inline(always)]
  pub fn iter(&self) -> std::slice::Iter<'_, Range> {
    self.ranges.iter()
  }
}

impl<'a> IntoIterator for &'a Selection {
  type Item = &'a Range;
  type IntoIter = std::slice::Iter<'a, Range>;

  fn into_iter(self) -> std::slice::Iter<'a, Range> {
    self.ranges.iter()
  }
}

impl From<Range> for Selection {
  fn from(range: Range) -> Self {
    Self {
      ranges: smallvec![range],
    }
  }
}

#[cfg(test)]
mod test {
  use ropey::Rope;

  use super::*;
  use crate::transaction::Transaction;

  #[test]
  fn test_new_empty() {
    let err = Selection::new(smallvec![]).unwrap_err();
    assert_eq!(err, SelectionError::EmptySelection);
  }

  #[test]
  fn test_create_normalizes_and_merges() {
    let sel = Selection::new(smallvec![
      Range::new(10, 12),
      Range::new(6, 7),
      Range::new(4, 5),
      Range::new(3, 4),
      Range::new(0, 6),
      Range::new(7, 8),
      Range::new(9, 13),
      Range::new(13, 14),
    ])
    .unwrap();

    let res = sel
      .ranges()
      .iter()
      .map(|range| format!("{}/{}", range.anchor, range.head))
      .collect::<Vec<String>>()
      .join(",");

    assert_eq!(res, "0/6,6/7,7/8,9/13,13/14");
  }

  #[test]
  fn test_carets_merge_duplicates() {
    let sel = Selection::carets([12, 3, 12, 7]).unwrap();
    assert_eq!(sel.ranges(), &[
      Range::point(3),
      Range::point(7),
      Range::point(12)
    ]);
    assert!(sel.is_empty());
    assert_eq!(sel.first(), Range::point(3));
  }

  #[test]
  fn test_overlaps() {
    fn overlaps(a: (usize, usize), b: (usize, usize)) -> bool {
      Range::new(a.0, a.1).overlaps(&Range::new(b.0, b.1))
    }

    assert!(!overlaps((0, 3), (3, 6)));
    assert!(!overlaps((6, 3), (0, 3)));
    assert!(overlaps((0, 4), (3, 6)));
    assert!(overlaps((4, 0), (6, 3)));

    // Carets against selections.
    assert!(!overlaps((0, 3), (3, 3)));
    assert!(overlaps((1, 4), (1, 1)));
    assert!(overlaps((1, 4), (3, 3)));

    // Carets against carets.
    assert!(!overlaps((0, 0), (1, 1)));
    assert!(overlaps((1, 1), (1, 1)));
  }

  #[test]
  fn test_ensure_within() {
    assert!(Range::new(0, 5).ensure_within(5).is_ok());
    assert_eq!(
      Range::new(7, 2).ensure_within(5).unwrap_err(),
      SelectionError::RangeExceedsText {
        from: 2,
        to:   7,
        len:  5,
      }
    );
  }

  #[test]
  fn test_map_caret_follows_typing() {
    let doc = Rope::from("ab");
    let tx = Transaction::change(&doc, vec![(1, 1, Some("x".into()))]).unwrap();

    let caret = Range::point(1).map(tx.changes()).unwrap();
    assert_eq!(caret, Range::point(2));

    // Edges of a selection stay outside of insertions at the edges.
    let sel = Range::new(1, 2).map(tx.changes()).unwrap();
    assert_eq!(sel, Range::new(2, 3));
    let sel = Range::new(0, 1).map(tx.changes()).unwrap();
    assert_eq!(sel, Range::new(0, 1));
  }
}
