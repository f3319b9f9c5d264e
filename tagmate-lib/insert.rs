use tracing::{
  debug,
  warn,
};

use crate::{
  document::Document,
  selection::Range,
};

/// Insert `text` at `pos`, leaving the selection mapped through the edit.
///
/// Failures are logged and reported as `false`; they never propagate.
pub fn insert_text(doc: &mut Document, pos: usize, text: &str) -> bool {
  match doc.replace_range(Range::point(pos), text) {
    Ok(()) => {
      debug!(pos, text, "inserted text");
      true
    },
    Err(err) => {
      warn!(pos, text, %err, "failed to insert text");
      false
    },
  }
}
