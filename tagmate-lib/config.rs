use serde::{
  Deserialize,
  Serialize,
  de::DeserializeOwned,
};
use thiserror::Error;
use toml::Value;
use tracing::warn;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
  #[error("failed to read config: {0}")]
  Io(#[from] std::io::Error),
  #[error("failed to parse config: {0}")]
  BadConfig(#[from] toml::de::Error),
  #[error("failed to serialize config: {0}")]
  Serialize(#[from] toml::ser::Error),
}

/// How a bare caret picks the phrase to wrap.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhrasePolicy {
  /// Everything from the start of the line up to the caret when it holds more
  /// than one word, otherwise the word under the caret.
  #[default]
  LinePrefix,
  /// The last whitespace-delimited token before the caret.
  LastWord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagConfig {
  /// When set, only files with one of these extensions are eligible and the
  /// selector options are ignored. Entries may carry a leading dot.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub allowed_extensions: Option<Vec<String>>,
  pub allowed_selectors:  Vec<String>,
  pub allow_all_files:    bool,
  pub allow_untitled:     bool,
  pub phrase_policy:      PhrasePolicy,
  /// Insert a closing tag after an opening tag is typed.
  pub auto_close:         bool,
}

impl Default for TagConfig {
  fn default() -> Self {
    Self {
      allowed_extensions: None,
      allowed_selectors:  vec![
        "text.html".to_owned(),
        "text.xml".to_owned(),
        "text.plain".to_owned(),
      ],
      allow_all_files:    true,
      allow_untitled:     true,
      phrase_policy:      PhrasePolicy::default(),
      auto_close:         true,
    }
  }
}

impl TagConfig {
  /// Build a config from a parsed TOML table.
  ///
  /// Each key is read on its own: a value of the wrong type keeps that key's
  /// default, unknown keys are ignored. Both are reported with `warn!`.
  pub fn from_value(value: Value) -> Self {
    let mut config = Self::default();
    let table = match value {
      Value::Table(table) => table,
      other => {
        warn!(
          kind = other.type_str(),
          "config root is not a table, using defaults"
        );
        return config;
      },
    };

    for (key, value) in table {
      match key.as_str() {
        "allowed_extensions" => {
          if let Some(extensions) = read_key(&key, value) {
            config.allowed_extensions = Some(extensions);
          }
        },
        "allowed_selectors" => read_into(&mut config.allowed_selectors, &key, value),
        "allow_all_files" => read_into(&mut config.allow_all_files, &key, value),
        "allow_untitled" => read_into(&mut config.allow_untitled, &key, value),
        "phrase_policy" => read_into(&mut config.phrase_policy, &key, value),
        "auto_close" => read_into(&mut config.auto_close, &key, value),
        _ => warn!(key, "ignoring unknown config key"),
      }
    }

    config
  }

  /// Parse a config file, falling back to defaults when it is not valid TOML.
  pub fn from_toml_str(source: &str) -> Self {
    match parse_toml(source) {
      Ok(value) => Self::from_value(value),
      Err(err) => {
        warn!(%err, "unparsable config, using defaults");
        Self::default()
      },
    }
  }

  /// Render the config as a TOML document.
  pub fn to_toml_string(&self) -> Result<String> {
    Ok(toml::to_string_pretty(self)?)
  }
}

pub fn parse_toml(source: &str) -> Result<Value> {
  Ok(toml::from_str(source)?)
}

fn read_key<T: DeserializeOwned>(key: &str, value: Value) -> Option<T> {
  match value.try_into() {
    Ok(value) => Some(value),
    Err(err) => {
      warn!(key, %err, "invalid config value, keeping default");
      None
    },
  }
}

fn read_into<T: DeserializeOwned>(slot: &mut T, key: &str, value: Value) {
  if let Some(value) = read_key(key, value) {
    *slot = value;
  }
}
