//! Insert a closing tag once an opening tag has been typed.
//!
//! [`on_modified`] runs after every modification. It looks at the char just
//! before each caret and, when an opening tag such as `<div>` has just been
//! completed there, returns the closing tag to insert. The insertion itself is
//! performed later by the caller, outside of the modification notification.
//!
//! While a closing tag is pending the watcher is in
//! [`CloseState::ClosingInFlight`] and ignores modifications, including the
//! one produced by inserting the closing tag.

use std::sync::OnceLock;

use regex::Regex;
use ropey::Rope;
use tagmate_core::line_ending::line_bounds;

use crate::{
  Tendril,
  selection::Selection,
};

/// Name of the per-document flag mirroring [`CloseState::ClosingInFlight`].
pub const IN_PROGRESS_KEY: &str = "auto_close_tag_in_progress";

/// Tag names are word chars, hyphens and whitespace.
const OPEN_TAG: &str = r"^<([\w\s-]+)>$";

fn open_tag_regex() -> &'static Regex {
  static OPEN_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
  OPEN_TAG_REGEX.get_or_init(|| Regex::new(OPEN_TAG).expect("open tag pattern compiles"))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CloseState {
  #[default]
  Idle,
  ClosingInFlight,
}

impl CloseState {
  pub fn in_progress(self) -> bool {
    self == Self::ClosingInFlight
  }
}

/// A closing tag waiting to be inserted at `pos`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingClose {
  pub pos:  usize,
  pub name: Tendril,
}

impl PendingClose {
  /// `</name>`
  pub fn closing_tag(&self) -> Tendril {
    let mut tag = Tendril::from("</");
    tag.push_str(&self.name);
    tag.push('>');
    tag
  }
}

/// React to a modification of `text`.
///
/// Returns the next watcher state and the closing tag to insert, if any. Only
/// the first caret that just completed an opening tag is considered.
pub fn on_modified(
  text: &Rope,
  selection: &Selection,
  state: CloseState,
  eligible: bool,
) -> (CloseState, Option<PendingClose>) {
  if !eligible || state.in_progress() {
    return (state, None);
  }

  let pending = selection.iter().find_map(|range| {
    let pos = range.head;
    open_tag_before(text, pos).map(|name| PendingClose { pos, name })
  });

  match pending {
    Some(pending) => {
      tracing::debug!(pos = pending.pos, name = %pending.name, "opening tag completed");
      (CloseState::ClosingInFlight, Some(pending))
    },
    None => (state, None),
  }
}

/// The trimmed name of the opening tag ending right before `pos`.
///
/// The `<` is searched for on the line holding `pos` only. No tag is reported
/// when a `<` already follows `pos`.
pub fn open_tag_before(text: &Rope, pos: usize) -> Option<Tendril> {
  if pos == 0 || pos > text.len_chars() {
    return None;
  }
  if text.get_char(pos) == Some('<') {
    tracing::trace!(pos, "tag already follows caret");
    return None;
  }
  if text.get_char(pos - 1) != Some('>') {
    return None;
  }

  let (line_start, _) = line_bounds(&text.slice(..), pos);
  let prefix: String = text.slice(line_start..pos).into();
  let open = prefix.rfind('<')?;

  let captures = open_tag_regex().captures(&prefix[open..])?;
  let name = captures.get(1)?.as_str().trim();
  if name.is_empty() {
    return None;
  }
  Some(name.into())
}

#[cfg(test)]
mod test {
  use smallvec::smallvec;

  use super::*;
  use crate::selection::Range;

  fn tag_before(text: &str, pos: usize) -> Option<Tendril> {
    open_tag_before(&Rope::from(text), pos)
  }

  #[test]
  fn detects_completed_opening_tag() {
    assert_eq!(tag_before("<Foo>", 5).as_deref(), Some("Foo"));
    assert_eq!(tag_before("text <my-tag_2>", 15).as_deref(), Some("my-tag_2"));
    assert_eq!(tag_before("<a><b>", 6).as_deref(), Some("b"));
    assert_eq!(tag_before("< div class >", 13).as_deref(), Some("div class"));
    assert_eq!(tag_before("<ünï>", 5).as_deref(), Some("ünï"));
  }

  #[test]
  fn ignores_non_tags() {
    assert_eq!(tag_before("</Foo>", 6), None);
    assert_eq!(tag_before("<br/>", 5), None);
    assert_eq!(tag_before("<>", 2), None);
    assert_eq!(tag_before("<   >", 5), None);
    assert_eq!(tag_before("<a.b>", 5), None);
    assert_eq!(tag_before("a > b", 3), None);
    assert_eq!(tag_before("Foo>", 4), None);
    assert_eq!(tag_before("", 0), None);
    assert_eq!(tag_before("<Foo>", 4), None);
    assert_eq!(tag_before("<Foo>", 9), None);
  }

  #[test]
  fn skips_when_tag_follows() {
    assert_eq!(tag_before("<Foo><bar>", 5), None);
  }

  #[test]
  fn does_not_cross_lines() {
    assert_eq!(tag_before("<div\n>", 6), None);
    assert_eq!(tag_before("<div\n<p>", 8).as_deref(), Some("p"));
    assert_eq!(tag_before("<div\r\n>", 7), None);
  }

  #[test]
  fn state_gates_the_watcher() {
    let text = Rope::from("<Foo>");
    let sel = Selection::point(5);

    let (state, pending) = on_modified(&text, &sel, CloseState::Idle, true);
    assert_eq!(state, CloseState::ClosingInFlight);
    assert_eq!(
      pending,
      Some(PendingClose {
        pos:  5,
        name: "Foo".into(),
      })
    );
    assert_eq!(pending.unwrap().closing_tag(), "</Foo>");

    let (state, pending) = on_modified(&text, &sel, CloseState::ClosingInFlight, true);
    assert_eq!(state, CloseState::ClosingInFlight);
    assert_eq!(pending, None);

    let (state, pending) = on_modified(&text, &sel, CloseState::Idle, false);
    assert_eq!(state, CloseState::Idle);
    assert_eq!(pending, None);
  }

  #[test]
  fn first_qualifying_caret_wins() {
    let text = Rope::from("<a> x <b>");
    let sel = Selection::new(smallvec![
      Range::point(5),
      Range::point(3),
      Range::point(9)
    ])
    .unwrap();
    let (_, pending) = on_modified(&text, &sel, CloseState::Idle, true);
    assert_eq!(
      pending,
      Some(PendingClose {
        pos:  3,
        name: "a".into(),
      })
    );
  }
}
