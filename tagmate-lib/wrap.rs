//! Wrap a phrase in a matching open/close tag pair.
//!
//! A non-empty selection is replaced whole, the tag name being its trimmed
//! text. A bare caret picks its phrase from the text between the start of its
//! line and the caret, following the configured [`PhrasePolicy`]:
//!
//! ```text
//! line-prefix: "  Hello world|"  ->  "  <Hello world>|</Hello world>"
//! line-prefix: "say hel|lo"      ->  "<say hel>|</say hel>lo"
//! line-prefix: "  hello|"        ->  "  <hello>|</hello>"
//! last-word:   "Hello world|"    ->  "Hello <world>|</world>"
//! ```
//!
//! Ranges are processed from the end of the document backwards so each
//! candidate is computed against offsets no earlier edit has moved. The
//! resulting selection is a single caret between the tags of the earliest
//! wrapped phrase.

use tagmate_core::chars::{
  char_is_whitespace,
  has_interior_whitespace,
};
use tracing::{
  debug,
  trace,
  warn,
};

use crate::{
  Tendril,
  config::PhrasePolicy,
  document::Document,
  selection::{
    Range,
    Selection,
  },
  transaction::{
    Change,
    Result,
    Transaction,
  },
};

/// A span of the document and the trimmed phrase it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
  pub from: usize,
  pub to:   usize,
  pub name: Tendril,
}

impl Phrase {
  /// `<name></name>`
  pub fn tags(&self) -> Tendril {
    let mut tags = Tendril::new();
    tags.push('<');
    tags.push_str(&self.name);
    tags.push_str("></");
    tags.push_str(&self.name);
    tags.push('>');
    tags
  }

  /// Offset of the caret between the tags once the phrase is replaced.
  pub fn caret(&self) -> usize {
    self.from + self.name.chars().count() + 2
  }
}

/// Build the transaction wrapping every range of `selection`, or `None` when
/// no range yields a phrase.
///
/// Ranges that cannot be resolved against the current text are logged and
/// skipped. A phrase overlapping one later in the document is skipped too.
pub fn wrap_selection(
  doc: &Document,
  selection: &Selection,
  policy: PhrasePolicy,
) -> Result<Option<Transaction>> {
  let len = doc.text().len_chars();
  let mut changes: Vec<Change> = Vec::with_capacity(selection.count());
  let mut caret = None;
  let mut lower_bound = usize::MAX;

  for range in selection.iter().rev() {
    if let Err(err) = range.ensure_within(len) {
      warn!(%err, "skipping range");
      continue;
    }

    let Some(phrase) = phrase_for_range(doc, *range, policy) else {
      trace!(?range, "no phrase to wrap");
      continue;
    };

    if phrase.to > lower_bound {
      warn!(
        from = phrase.from,
        to = phrase.to,
        "phrase overlaps a later one, skipping"
      );
      continue;
    }

    debug!(from = phrase.from, to = phrase.to, name = %phrase.name, "wrapping phrase");
    lower_bound = phrase.from;
    caret = Some(phrase.caret());
    changes.push((phrase.from, phrase.to, Some(phrase.tags())));
  }

  let Some(caret) = caret else {
    return Ok(None);
  };

  changes.reverse();
  let tx = Transaction::change(doc.text(), changes)?.with_selection(Selection::point(caret));
  Ok(Some(tx))
}

/// The phrase a single range would wrap. `range` must lie within the text.
pub fn phrase_for_range(doc: &Document, range: Range, policy: PhrasePolicy) -> Option<Phrase> {
  if !range.is_empty() {
    // The whole selection is replaced, surrounding whitespace included.
    let raw = range.fragment(doc.text().slice(..));
    let name = raw.trim_matches(char_is_whitespace);
    return (!name.is_empty()).then(|| Phrase {
      from: range.from(),
      to:   range.to(),
      name: name.into(),
    });
  }

  let pos = range.head;
  let (line_start, _) = doc.line_bounds(pos);
  if pos == line_start {
    return None;
  }
  let prefix: String = doc.text().slice(line_start..pos).into();

  match policy {
    PhrasePolicy::LinePrefix => {
      if prefix.trim_matches(char_is_whitespace).is_empty() {
        None
      } else if has_interior_whitespace(&prefix) {
        trimmed_phrase(&prefix, line_start)
      } else {
        let word = doc.word_at(pos);
        let raw = word.fragment(doc.text().slice(..));
        trimmed_phrase(&raw, word.from())
      }
    },
    PhrasePolicy::LastWord => {
      let head = prefix.trim_end_matches(char_is_whitespace);
      let token_start = head
        .char_indices()
        .rev()
        .find(|&(_, ch)| char_is_whitespace(ch))
        .map_or(0, |(idx, ch)| idx + ch.len_utf8());
      let token = &head[token_start..];
      if token.is_empty() {
        return None;
      }
      let from = line_start + head[..token_start].chars().count();
      Some(Phrase {
        from,
        to: from + token.chars().count(),
        name: token.into(),
      })
    },
  }
}

/// Trim `raw`, which starts at char offset `start`, down to the span of its
/// non-whitespace content.
fn trimmed_phrase(raw: &str, start: usize) -> Option<Phrase> {
  let name = raw.trim_matches(char_is_whitespace);
  if name.is_empty() {
    return None;
  }
  let leading = raw.chars().take_while(|&ch| char_is_whitespace(ch)).count();
  let from = start + leading;
  Some(Phrase {
    from,
    to: from + name.chars().count(),
    name: name.into(),
  })
}

#[cfg(test)]
mod test {
  use quickcheck::TestResult;
  use ropey::Rope;
  use smallvec::smallvec;

  use super::*;
  use crate::document::DocumentId;

  fn doc(text: &str) -> Document {
    Document::new(DocumentId::default(), Rope::from(text))
  }

  fn wrap(text: &str, selection: Selection, policy: PhrasePolicy) -> Option<(String, Selection)> {
    let mut doc = doc(text);
    let tx = wrap_selection(&doc, &selection, policy).unwrap()?;
    doc.apply_transaction(&tx).unwrap();
    Some((doc.text().to_string(), doc.selection().clone()))
  }

  #[test]
  fn wraps_trimmed_selection() {
    let (text, sel) = wrap(
      "say  hello  now",
      Selection::single(3, 12),
      PhrasePolicy::LinePrefix,
    )
    .unwrap();
    assert_eq!(text, "say<hello></hello>now");
    assert_eq!(sel, Selection::point(10));
  }

  #[test]
  fn whitespace_selection_is_noop() {
    assert_eq!(
      wrap("a   b", Selection::single(1, 4), PhrasePolicy::LinePrefix),
      None
    );
  }

  #[test]
  fn line_prefix_with_spaces_keeps_indentation() {
    let (text, sel) = wrap(
      "<p>\n  Hello world\n</p>",
      Selection::point(17),
      PhrasePolicy::LinePrefix,
    )
    .unwrap();
    assert_eq!(text, "<p>\n  <Hello world></Hello world>\n</p>");
    assert_eq!(sel, Selection::point(19));
  }

  #[test]
  fn line_prefix_single_word_uses_word_lookup() {
    // The caret sits inside "hello", the whole word is wrapped.
    let (text, sel) = wrap("  hello!", Selection::point(4), PhrasePolicy::LinePrefix).unwrap();
    assert_eq!(text, "  <hello></hello>!");
    assert_eq!(sel, Selection::point(9));
  }

  #[test]
  fn caret_at_line_start_is_noop() {
    assert_eq!(
      wrap("one\ntwo", Selection::point(4), PhrasePolicy::LinePrefix),
      None
    );
    assert_eq!(
      wrap("one\n   two", Selection::point(6), PhrasePolicy::LastWord),
      None
    );
  }

  #[test]
  fn zero_width_space_prefix_is_noop() {
    assert_eq!(
      wrap("\u{200B}\u{200B}", Selection::point(2), PhrasePolicy::LinePrefix),
      None
    );
    assert_eq!(
      wrap("\u{200B} \u{200B}", Selection::point(3), PhrasePolicy::LinePrefix),
      None
    );
  }

  #[test]
  fn last_word_policy() {
    let (text, sel) = wrap("Hello world", Selection::point(11), PhrasePolicy::LastWord).unwrap();
    assert_eq!(text, "Hello <world></world>");
    assert_eq!(sel, Selection::point(13));

    // Trailing whitespace is not part of the token.
    let (text, _) = wrap("Hello wörld  ", Selection::point(13), PhrasePolicy::LastWord).unwrap();
    assert_eq!(text, "Hello <wörld></wörld>  ");
  }

  #[test]
  fn multiple_carets_wrap_back_to_front() {
    let selection = Selection::new(smallvec![Range::point(3), Range::point(7)]).unwrap();
    let (text, sel) = wrap("one\ntwo", selection, PhrasePolicy::LinePrefix).unwrap();
    assert_eq!(text, "<one></one>\n<two></two>");
    assert_eq!(sel, Selection::point(5));
  }

  #[test]
  fn overlapping_phrases_keep_the_later_one() {
    // Both carets resolve to "hello".
    let selection = Selection::new(smallvec![Range::point(1), Range::point(4)]).unwrap();
    let (text, sel) = wrap("hello", selection, PhrasePolicy::LinePrefix).unwrap();
    assert_eq!(text, "<hello></hello>");
    assert_eq!(sel, Selection::point(7));
  }

  #[test]
  fn stale_range_is_skipped() {
    let selection = Selection::new(smallvec![Range::point(2), Range::new(40, 50)]).unwrap();
    let (text, sel) = wrap("hi", selection, PhrasePolicy::LinePrefix).unwrap();
    assert_eq!(text, "<hi></hi>");
    assert_eq!(sel, Selection::point(4));
  }

  quickcheck::quickcheck! {
    fn wrapping_a_selection_yields_tag_pair(text: String) -> TestResult {
      let name = text.trim_matches(char_is_whitespace);
      if name.is_empty() || name.contains(['<', '>']) {
        return TestResult::discard();
      }

      let len = text.chars().count();
      let Some((wrapped, sel)) = wrap(&text, Selection::single(0, len), PhrasePolicy::LinePrefix)
      else {
        return TestResult::failed();
      };

      TestResult::from_bool(
        wrapped == format!("<{name}></{name}>")
          && sel == Selection::point(name.chars().count() + 2),
      )
    }
  }
}
