//! Whether the tag behaviors run for a document at all.

use std::path::Path;

use tracing::trace;

use crate::{
  config::TagConfig,
  document::Document,
  scope::Selector,
};

/// Decide eligibility from a document's path and base scope.
///
/// Untitled documents follow `allow_untitled`. Otherwise an
/// `allowed_extensions` list, when configured, is the only rule. Without one,
/// `allow_all_files` or any matching `allowed_selectors` entry makes the
/// document eligible.
pub fn is_eligible(path: Option<&Path>, scope: &str, config: &TagConfig) -> bool {
  let Some(path) = path else {
    return config.allow_untitled;
  };

  if let Some(allowed) = &config.allowed_extensions {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
      trace!(path = %path.display(), "no extension, not eligible");
      return false;
    };
    return allowed
      .iter()
      .any(|entry| entry.trim_start_matches('.').eq_ignore_ascii_case(ext));
  }

  config.allow_all_files
    || config
      .allowed_selectors
      .iter()
      .any(|selector| Selector::parse(selector).matches(scope))
}

/// Eligibility of a document, using the scope at its first char.
pub fn is_document_eligible(doc: &Document, config: &TagConfig) -> bool {
  let eligible = is_eligible(doc.path(), doc.scope_at(0), config);
  trace!(doc = %doc.display_name(), eligible, "checked eligibility");
  eligible
}

#[cfg(test)]
mod test {
  use std::path::PathBuf;

  use super::*;

  fn config() -> TagConfig {
    TagConfig::default()
  }

  #[test]
  fn untitled_follows_allow_untitled() {
    let mut config = config();
    assert!(is_eligible(None, "text.plain", &config));
    config.allow_untitled = false;
    assert!(!is_eligible(None, "text.html.basic", &config));

    // Extension rules do not apply to untitled documents.
    config.allow_untitled = true;
    config.allowed_extensions = Some(vec!["html".to_owned()]);
    assert!(is_eligible(None, "text.plain", &config));
  }

  #[test]
  fn extensions_are_case_insensitive() {
    let mut config = config();
    config.allowed_extensions = Some(vec![".HTML".to_owned(), "xml".to_owned()]);
    let path = PathBuf::from("index.html");
    assert!(is_eligible(Some(&path), "text.html.basic", &config));
    let path = PathBuf::from("FEED.Xml");
    assert!(is_eligible(Some(&path), "text.xml", &config));
    let path = PathBuf::from("main.rs");
    assert!(!is_eligible(Some(&path), "text.plain", &config));
    let path = PathBuf::from("Makefile");
    assert!(!is_eligible(Some(&path), "text.plain", &config));
  }

  #[test]
  fn extensions_override_selectors() {
    let mut config = config();
    config.allowed_extensions = Some(Vec::new());
    assert!(config.allow_all_files);
    let path = PathBuf::from("index.html");
    assert!(!is_eligible(Some(&path), "text.html.basic", &config));
  }

  #[test]
  fn selectors_when_not_all_files() {
    let mut config = config();
    config.allow_all_files = false;
    let path = PathBuf::from("page.html");
    assert!(is_eligible(Some(&path), "text.html.basic", &config));
    let path = PathBuf::from("lib.rs");
    assert!(!is_eligible(Some(&path), "source.rust", &config));

    config.allowed_selectors.clear();
    let path = PathBuf::from("page.html");
    assert!(!is_eligible(Some(&path), "text.html.basic", &config));
  }

  quickcheck::quickcheck! {
    fn eligibility_is_idempotent(
      name: Option<String>,
      scope: String,
      extensions: Option<Vec<String>>,
      allow_all_files: bool,
      allow_untitled: bool
    ) -> bool {
      let config = TagConfig {
        allowed_extensions: extensions,
        allow_all_files,
        allow_untitled,
        ..TagConfig::default()
      };
      let path = name.map(PathBuf::from);
      let first = is_eligible(path.as_deref(), &scope, &config);
      first == is_eligible(path.as_deref(), &scope, &config)
    }
  }
}
