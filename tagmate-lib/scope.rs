//! Scope names and scope selectors.
//!
//! A scope is a dotted classification such as `text.html.basic`; a scope
//! stack is several of them separated by spaces, outermost first. Documents
//! here carry a single base scope derived from their file extension.
//!
//! Selectors use the familiar syntax:
//!
//! ```text
//! text.html, text.xml          either alternative
//! text.html meta.tag           `meta.tag` nested somewhere inside `text.html`
//! text - text.plain            any `text.*` scope that is not `text.plain`
//! ```
//!
//! An atom matches a scope when its segments are a prefix of the scope's
//! segments, so `text.html` matches `text.html.basic` but not `text.htmlx`.

use std::path::Path;

pub const PLAIN_TEXT: &str = "text.plain";

/// Derive the base scope of a document from its path. Untitled documents and
/// unknown extensions are plain text.
pub fn scope_for_path(path: Option<&Path>) -> &'static str {
  let Some(ext) = path
    .and_then(Path::extension)
    .and_then(|ext| ext.to_str())
  else {
    return PLAIN_TEXT;
  };

  match ext.to_ascii_lowercase().as_str() {
    "html" | "htm" | "xhtml" => "text.html.basic",
    "xml" | "xsl" | "xslt" | "plist" => "text.xml",
    "svg" => "text.xml.svg",
    "md" | "markdown" => "text.html.markdown",
    "vue" => "text.html.vue",
    "jsx" => "source.js.jsx",
    "tsx" => "source.tsx",
    "js" | "mjs" | "cjs" => "source.js",
    "ts" => "source.ts",
    "css" => "source.css",
    _ => PLAIN_TEXT,
  }
}

/// A parsed scope selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
  alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Alternative {
  include: Vec<String>,
  exclude: Vec<Vec<String>>,
}

impl Selector {
  pub fn parse(source: &str) -> Self {
    let alternatives = source
      .split(',')
      .filter_map(|alternative| {
        let mut parts = alternative.split(" - ");
        let include = atoms(parts.next()?);
        if include.is_empty() {
          return None;
        }
        let exclude = parts.map(atoms).filter(|path| !path.is_empty()).collect();
        Some(Alternative { include, exclude })
      })
      .collect();
    Self { alternatives }
  }

  pub fn matches(&self, scope: &str) -> bool {
    let stack: Vec<&str> = scope.split_whitespace().collect();
    self.alternatives.iter().any(|alternative| {
      path_matches(&alternative.include, &stack)
        && !alternative
          .exclude
          .iter()
          .any(|path| path_matches(path, &stack))
    })
  }
}

fn atoms(path: &str) -> Vec<String> {
  path.split_whitespace().map(str::to_owned).collect()
}

/// Atoms must match stack entries in order, skipping entries as needed.
fn path_matches(path: &[String], stack: &[&str]) -> bool {
  let mut stack = stack.iter();
  path
    .iter()
    .all(|atom| stack.any(|scope| atom_matches(atom, scope)))
}

fn atom_matches(atom: &str, scope: &str) -> bool {
  let mut scope_segments = scope.split('.');
  atom
    .split('.')
    .all(|segment| scope_segments.next() == Some(segment))
}
