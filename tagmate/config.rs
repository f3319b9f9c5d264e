use std::{
  fs,
  io::ErrorKind,
  path::Path,
};

use tagmate_lib::config::{
  ConfigError,
  TagConfig,
  parse_toml,
};
use tagmate_loader::merge_toml_values;

/// Layer the workspace config over the user config.
///
/// A layer that is missing is skipped quietly. A layer that cannot be read or
/// parsed is skipped with a warning. Neither is fatal.
pub fn load(
  global: Result<String, ConfigError>,
  local: Result<String, ConfigError>,
) -> TagConfig {
  let global = layer("user", global);
  let local = layer("workspace", local);

  let value = match (global, local) {
    (None, None) => return TagConfig::default(),
    (Some(value), None) | (None, Some(value)) => value,
    (Some(global), Some(local)) => merge_toml_values(global, local, 3),
  };
  TagConfig::from_value(value)
}

fn layer(name: &str, source: Result<String, ConfigError>) -> Option<toml::Value> {
  match source.and_then(|source| parse_toml(&source)) {
    Ok(value) => Some(value),
    Err(ConfigError::Io(err)) if err.kind() == ErrorKind::NotFound => None,
    Err(err) => {
      log::warn!("ignoring {name} config: {err}");
      None
    },
  }
}

/// Load `config_file` and the workspace config of the current directory.
pub fn load_user(config_file: &Path) -> TagConfig {
  let global = fs::read_to_string(config_file).map_err(ConfigError::Io);
  let local =
    fs::read_to_string(tagmate_loader::workspace_config_file()).map_err(ConfigError::Io);
  load(global, local)
}
