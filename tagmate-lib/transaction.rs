//! Edits to a document expressed as a sequence of operations.
//!
//! A [`ChangeSet`] walks the document from the start: `Retain(n)` keeps `n`
//! chars, `Delete(n)` drops them and `Insert(s)` adds `s` at the current
//! offset. A replacement is an `Insert` immediately followed by a `Delete`.
//!
//! A [`Transaction`] wraps a changeset with an optional selection to install
//! once it has been applied. Without one, the document maps its existing
//! selection through the changes.
//!
//! ```ignore
//! use tagmate_lib::transaction::Transaction;
//! use ropey::Rope;
//!
//! let mut doc = Rope::from("hello world");
//! let tx = Transaction::change(&doc, vec![(6, 11, Some("<world></world>".into()))])?;
//! tx.apply(&mut doc)?;
//! assert_eq!(doc, "hello <world></world>");
//! ```

use ropey::Rope;
use thiserror::Error;

use crate::{
  Tendril,
  selection::{
    Range,
    Selection,
  },
};

pub type Result<T> = std::result::Result<T, TransactionError>;

/// (from, to) replacement.
pub type Change = (usize, usize, Option<Tendril>);

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransactionError {
  #[error("changeset length mismatch: expected {expected}, got {actual}")]
  LengthMismatch { expected: usize, actual: usize },
  #[error("invalid change range: start {from} is after end {to}")]
  InvalidRange { from: usize, to: usize },
  #[error("change range {from}..{to} is out of bounds for document length {len}")]
  RangeOutOfBounds {
    from: usize,
    to:   usize,
    len:  usize,
  },
  #[error("change range {from}..{to} overlaps previous end {prev_end}")]
  OverlappingRange {
    prev_end: usize,
    from:     usize,
    to:       usize,
  },
  #[error("position {pos} is out of bounds for changeset length {len}")]
  PositionOutOfBounds { pos: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
  /// Keep n characters.
  Retain(usize),

  /// Delete n characters.
  Delete(usize),

  /// Insert text at the current offset.
  Insert(Tendril),
}

/// Which side of an insertion a mapped position ends up on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Assoc {
  Before,
  After,
}

impl Assoc {
  fn insert_offset(self, inserted: usize) -> usize {
    match self {
      Assoc::Before => 0,
      Assoc::After => inserted,
    }
  }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
  changes: Vec<Operation>,
  /// The required document length. Will refuse to apply changes unless it
  /// matches.
  len:     usize,
}

impl ChangeSet {
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      changes: Vec::with_capacity(capacity),
      len:     0,
    }
  }

  /// Expected document length before the changes.
  pub fn len(&self) -> usize {
    self.len
  }

  pub fn delete(&mut self, n: usize) {
    use Operation::*;

    if n == 0 {
      return;
    }

    self.len += n;

    if let Some(Delete(count)) = self.changes.last_mut() {
      *count += n;
    } else {
      self.changes.push(Delete(n))
    }
  }

  pub fn insert(&mut self, fragment: Tendril) {
    use Operation::*;

    if fragment.is_empty() {
      return;
    }

    // Keep inserts ahead of deletes so a replacement is always Insert, Delete.
    let new_last = match self.changes.as_mut_slice() {
      [.., Insert(prev)] | [.., Insert(prev), Delete(_)] => {
        prev.push_str(&fragment);
        return;
      },
      [.., last @ Delete(_)] => std::mem::replace(last, Insert(fragment)),
      _ => Insert(fragment),
    };

    self.changes.push(new_last);
  }

  pub fn retain(&mut self, n: usize) {
    use Operation::*;

    if n == 0 {
      return;
    }

    self.len += n;

    if let Some(Retain(count)) = self.changes.last_mut() {
      *count += n;
    } else {
      self.changes.push(Retain(n))
    }
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.changes.is_empty() || self.changes == [Operation::Retain(self.len)]
  }

  /// Apply this changeset in-place.
  pub fn apply(&self, text: &mut Rope) -> Result<()> {
    let actual = text.len_chars();
    if actual != self.len {
      return Err(TransactionError::LengthMismatch {
        expected: self.len,
        actual,
      });
    }

    let mut pos = 0;
    for change in &self.changes {
      use Operation::*;
      match change {
        Retain(n) => pos += n,
        Delete(n) => text.remove(pos..pos + *n),
        Insert(s) => {
          text.insert(pos, s);
          pos += s.chars().count();
        },
      }
    }

    Ok(())
  }

  /// Map a position through the changes.
  ///
  /// Positions inside deleted text collapse to the start of the deletion. At
  /// a pure insertion, `Before` keeps the position ahead of the new text and
  /// `After` moves it past it. The start of a replaced span stays at the
  /// start of the replacement.
  pub fn map_pos(&self, pos: usize, assoc: Assoc) -> Result<usize> {
    use Operation::*;

    let mut old_pos = 0;
    let mut new_pos = 0;
    let mut iter = self.changes.iter().peekable();

    while let Some(change) = iter.next() {
      match change {
        Retain(n) => {
          if pos < old_pos + n {
            return Ok(new_pos + (pos - old_pos));
          }
          old_pos += n;
          new_pos += n;
        },
        Delete(n) => {
          if pos < old_pos + n {
            return Ok(new_pos);
          }
          old_pos += n;
        },
        Insert(s) => {
          let inserted = s.chars().count();
          let replaced = match iter.peek() {
            Some(Delete(n)) => {
              let n = *n;
              iter.next();
              n
            },
            _ => 0,
          };

          if pos == old_pos {
            return Ok(if replaced == 0 {
              new_pos + assoc.insert_offset(inserted)
            } else {
              new_pos
            });
          }
          if pos < old_pos + replaced {
            return Ok(new_pos + assoc.insert_offset(inserted));
          }
          old_pos += replaced;
          new_pos += inserted;
        },
      }
    }

    if pos == old_pos {
      Ok(new_pos)
    } else {
      Err(TransactionError::PositionOutOfBounds { pos, len: self.len })
    }
  }
}

fn validate_change_bounds(from: usize, to: usize, len: usize) -> Result<()> {
  if from > to {
    return Err(TransactionError::InvalidRange { from, to });
  }
  if to > len {
    return Err(TransactionError::RangeOutOfBounds { from, to, len });
  }
  Ok(())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Transaction {
  changes:   ChangeSet,
  selection: Option<Selection>,
}

impl From<ChangeSet> for Transaction {
  fn from(changes: ChangeSet) -> Self {
    Self {
      changes,
      selection: None,
    }
  }
}

impl Transaction {
  /// Changes made to the buffer.
  pub fn changes(&self) -> &ChangeSet {
    &self.changes
  }

  /// When set, explicitly updates the selection.
  pub fn selection(&self) -> Option<&Selection> {
    self.selection.as_ref()
  }

  /// Apply this transaction in-place.
  pub fn apply(&self, doc: &mut Rope) -> Result<()> {
    self.changes.apply(doc)
  }

  pub fn with_selection(mut self, selection: Selection) -> Self {
    self.selection = Some(selection);
    self
  }

  /// Generate a transaction from a set of changes sorted by position.
  pub fn change<I>(doc: &Rope, changes: I) -> Result<Self>
  where
    I: IntoIterator<Item = Change>,
  {
    let len = doc.len_chars();
    let changes = changes.into_iter();
    let (lower, upper) = changes.size_hint();
    let mut changeset = ChangeSet::with_capacity(2 * upper.unwrap_or(lower) + 1);

    let mut last = 0;
    for (from, to, tendril) in changes {
      validate_change_bounds(from, to, len)?;
      if from < last {
        return Err(TransactionError::OverlappingRange {
          prev_end: last,
          from,
          to,
        });
      }

      changeset.retain(from - last);
      if let Some(text) = tendril {
        changeset.insert(text);
      }
      changeset.delete(to - from);
      last = to;
    }

    changeset.retain(len - last);

    Ok(Self::from(changeset))
  }

  /// Generate a transaction with a change per selection range.
  pub fn change_by_selection<F>(doc: &Rope, selection: &Selection, f: F) -> Result<Self>
  where
    F: FnMut(&Range) -> Change,
  {
    Self::change(doc, selection.iter().map(f))
  }

  /// Insert text at each selection head.
  pub fn insert(doc: &Rope, selection: &Selection, text: Tendril) -> Result<Self> {
    Self::change_by_selection(doc, selection, |range| {
      (range.head, range.head, Some(text.clone()))
    })
  }
}
