//! The text buffer the tag behaviors operate on.
//!
//! A [`Document`] owns its text, selection and scope name, and exposes the
//! small set of queries the behaviors need: line bounds, word lookup and
//! scope selector matching. There is no IO here; callers read and write
//! files themselves.
//!
//! ```no_run
//! use std::num::NonZeroUsize;
//!
//! use ropey::Rope;
//! use tagmate_lib::{
//!   document::{
//!     Document,
//!     DocumentId,
//!   },
//!   transaction::Transaction,
//! };
//!
//! let id = DocumentId::new(NonZeroUsize::new(1).unwrap());
//! let mut doc = Document::new(id, Rope::from("hello"));
//!
//! let tx = Transaction::change(doc.text(), vec![(0, 5, Some("<hello></hello>".into()))]).unwrap();
//! doc.apply_transaction(&tx).unwrap();
//! ```

use std::{
  borrow::Cow,
  num::NonZeroUsize,
  path::{
    Path,
    PathBuf,
  },
};

use ropey::Rope;
use tagmate_core::{
  chars::char_is_word,
  line_ending::line_bounds,
};
use thiserror::Error;

use crate::{
  Tendril,
  scope::{
    Selector,
    scope_for_path,
  },
  selection::{
    Range,
    Selection,
    SelectionError,
  },
  transaction::{
    Transaction,
    TransactionError,
  },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(NonZeroUsize);

impl DocumentId {
  pub const fn new(id: NonZeroUsize) -> Self {
    Self(id)
  }
}

impl Default for DocumentId {
  fn default() -> Self {
    Self(NonZeroUsize::MIN)
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
  #[error(transparent)]
  Transaction(#[from] TransactionError),
  #[error(transparent)]
  Selection(#[from] SelectionError),
}

pub type Result<T> = std::result::Result<T, DocumentError>;

#[derive(Debug, Clone)]
pub struct Document {
  id:        DocumentId,
  path:      Option<PathBuf>,
  text:      Rope,
  selection: Selection,
  scope:     Tendril,
  version:   u64,
  modified:  bool,
}

impl Document {
  pub fn new(id: DocumentId, text: Rope) -> Self {
    Self {
      id,
      path: None,
      text,
      selection: Selection::point(0),
      scope: scope_for_path(None).into(),
      version: 0,
      modified: false,
    }
  }

  /// Associate the document with a file. The scope follows the extension.
  #[must_use]
  pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
    self.set_path(Some(path.into()));
    self
  }

  /// `None` for untitled documents.
  pub fn path(&self) -> Option<&Path> {
    self.path.as_deref()
  }

  pub fn set_path(&mut self, path: Option<PathBuf>) {
    self.scope = scope_for_path(path.as_deref()).into();
    self.path = path;
  }

  pub fn display_name(&self) -> Cow<'_, str> {
    match &self.path {
      Some(path) => path.to_string_lossy(),
      None => Cow::Borrowed("<untitled>"),
    }
  }

  pub fn text(&self) -> &Rope {
    &self.text
  }

  pub fn selection(&self) -> &Selection {
    &self.selection
  }

  /// Replace the selection. Every range must lie within the text.
  pub fn set_selection(&mut self, selection: Selection) -> Result<()> {
    let len = self.text.len_chars();
    for range in &selection {
      range.ensure_within(len)?;
    }
    self.selection = selection;
    Ok(())
  }

  pub fn version(&self) -> u64 {
    self.version
  }

  pub fn is_modified(&self) -> bool {
    self.modified
  }

  /// Apply a transaction, then install its selection or map the current one
  /// through its changes.
  pub fn apply_transaction(&mut self, transaction: &Transaction) -> Result<()> {
    transaction.apply(&mut self.text)?;

    self.selection = match transaction.selection() {
      Some(selection) => selection.clone(),
      None => self.selection.clone().map(transaction.changes())?,
    };

    if !transaction.changes().is_empty() {
      self.modified = true;
      self.version = self.version.saturating_add(1);
    }

    Ok(())
  }

  pub fn replace_range(&mut self, range: Range, text: impl Into<Tendril>) -> Result<()> {
    let tx = Transaction::change(&self.text, vec![(
      range.from(),
      range.to(),
      Some(text.into()),
    )])?;
    self.apply_transaction(&tx)
  }

  /// Bounds of the line holding `pos`, without its line ending.
  pub fn line_bounds(&self, pos: usize) -> (usize, usize) {
    line_bounds(&self.text.slice(..), pos)
  }

  /// The word touching `pos`.
  ///
  /// A caret directly after a word selects that word. When no word char is
  /// on either side of `pos` the result is an empty range at `pos`.
  pub fn word_at(&self, pos: usize) -> Range {
    let text = self.text.slice(..);
    let pos = pos.min(text.len_chars());
    let is_word = |idx: usize| text.get_char(idx).is_some_and(char_is_word);

    let mut start = pos;
    while start > 0 && is_word(start - 1) {
      start -= 1;
    }
    let mut end = pos;
    while is_word(end) {
      end += 1;
    }

    Range::new(start, end)
  }

  /// The scope name at `pos`. Documents carry a single base scope.
  pub fn scope_at(&self, _pos: usize) -> &str {
    &self.scope
  }

  /// Override the scope derived from the path.
  pub fn set_scope(&mut self, scope: impl Into<Tendril>) {
    self.scope = scope.into();
  }

  pub fn match_selector(&self, pos: usize, selector: &str) -> bool {
    Selector::parse(selector).matches(self.scope_at(pos))
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn doc(text: &str) -> Document {
    Document::new(DocumentId::default(), Rope::from(text))
  }

  #[test]
  fn apply_transaction_maps_selection() {
    let mut doc = doc("hello");
    doc.set_selection(Selection::point(5)).unwrap();

    let tx = Transaction::change(doc.text(), vec![(0, 0, Some(">> ".into()))]).unwrap();
    doc.apply_transaction(&tx).unwrap();

    assert_eq!(doc.text(), &Rope::from(">> hello"));
    assert_eq!(doc.selection(), &Selection::point(8));
    assert_eq!(doc.version(), 1);
    assert!(doc.is_modified());
  }

  #[test]
  fn apply_transaction_uses_explicit_selection() {
    let mut doc = doc("hello");
    let tx = Transaction::change(doc.text(), vec![(0, 5, Some("<hello></hello>".into()))])
      .unwrap()
      .with_selection(Selection::point(7));
    doc.apply_transaction(&tx).unwrap();

    assert_eq!(doc.text(), &Rope::from("<hello></hello>"));
    assert_eq!(doc.selection(), &Selection::point(7));
  }

  #[test]
  fn set_selection_rejects_stale_ranges() {
    let mut doc = doc("abc");
    assert_eq!(
      doc.set_selection(Selection::single(1, 9)).unwrap_err(),
      DocumentError::Selection(SelectionError::RangeExceedsText {
        from: 1,
        to:   9,
        len:  3,
      })
    );
    assert_eq!(doc.selection(), &Selection::point(0));
  }

  #[test]
  fn replace_range_out_of_bounds() {
    let mut doc = doc("abc");
    assert!(matches!(
      doc.replace_range(Range::new(2, 7), "x"),
      Err(DocumentError::Transaction(
        TransactionError::RangeOutOfBounds { .. }
      ))
    ));
    assert_eq!(doc.version(), 0);
  }

  #[test]
  fn word_at() {
    let doc = doc("say hello_there, ok");
    assert_eq!(doc.word_at(4), Range::new(4, 15));
    assert_eq!(doc.word_at(8), Range::new(4, 15));
    // Caret right after the word.
    assert_eq!(doc.word_at(15), Range::new(4, 15));
    // Between a comma and a space.
    assert_eq!(doc.word_at(16), Range::point(16));
    assert_eq!(doc.word_at(19), Range::new(17, 19));
    assert_eq!(doc.word_at(99), Range::new(17, 19));
  }

  #[test]
  fn scope_follows_path() {
    let mut doc = doc("");
    assert_eq!(doc.display_name(), "<untitled>");
    assert_eq!(doc.scope_at(0), "text.plain");

    doc.set_path(Some(PathBuf::from("page.html")));
    assert_eq!(doc.scope_at(0), "text.html.basic");
    assert!(doc.match_selector(0, "text.html"));
    assert!(!doc.match_selector(0, "text.xml, source"));

    doc.set_scope("source.rust");
    assert!(doc.match_selector(0, "source"));
  }
}
