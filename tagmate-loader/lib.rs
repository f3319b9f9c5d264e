//! Filesystem locations used by tagmate and TOML layering.

use std::{
  path::{
    Path,
    PathBuf,
  },
  sync::OnceLock,
};

use etcetera::{
  HomeDirError,
  base_strategy::{
    BaseStrategy,
    choose_base_strategy,
  },
};

const APP_DIR: &str = "tagmate";
pub const CONFIG_FILE_NAME: &str = "tagmate.toml";
pub const WORKSPACE_CONFIG_FILE_NAME: &str = ".tagmate.toml";

static CONFIG_FILE: OnceLock<PathBuf> = OnceLock::new();

static LOG_FILE: OnceLock<PathBuf> = OnceLock::new();

pub fn initialize_config_file(specified_file: Option<PathBuf>) {
  let config_file = specified_file.unwrap_or_else(default_config_file);
  ensure_parent_dir(&config_file);
  CONFIG_FILE.set(config_file).ok();
}

pub fn initialize_log_file(specified_file: Option<PathBuf>) {
  let log_file = specified_file.unwrap_or_else(default_log_file);
  ensure_parent_dir(&log_file);
  LOG_FILE.set(log_file).ok();
}

/// Expand a leading `~` to the home directory. Paths are returned unchanged
/// when there is no `~` or no home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let Ok(rest) = path.strip_prefix("~") else {
    return path.to_owned();
  };
  match etcetera::home_dir() {
    Ok(home) => home.join(rest),
    Err(_) => path.to_owned(),
  }
}

fn homeless_dir(err: HomeDirError) -> PathBuf {
  log::warn!("unable to find the home directory ({err}), using ./.{APP_DIR}");
  PathBuf::from(format!(".{APP_DIR}"))
}

/// `TAGMATE_CONFIG_DIR`, or the platform config directory.
pub fn config_dir() -> PathBuf {
  if let Ok(dir) = std::env::var("TAGMATE_CONFIG_DIR") {
    return expand_tilde(Path::new(&dir));
  }
  match choose_base_strategy() {
    Ok(strategy) => strategy.config_dir().join(APP_DIR),
    Err(err) => homeless_dir(err),
  }
}

/// `TAGMATE_CACHE_DIR`, or the platform cache directory.
pub fn cache_dir() -> PathBuf {
  if let Ok(dir) = std::env::var("TAGMATE_CACHE_DIR") {
    return expand_tilde(Path::new(&dir));
  }
  match choose_base_strategy() {
    Ok(strategy) => strategy.cache_dir().join(APP_DIR),
    Err(err) => homeless_dir(err),
  }
}

pub fn config_file() -> PathBuf {
  CONFIG_FILE
    .get_or_init(|| {
      let path = default_config_file();
      ensure_parent_dir(&path);
      path
    })
    .clone()
}

pub fn log_file() -> PathBuf {
  LOG_FILE
    .get_or_init(|| {
      let path = default_log_file();
      ensure_parent_dir(&path);
      path
    })
    .clone()
}

pub fn workspace_config_file() -> PathBuf {
  find_workspace().0.join(WORKSPACE_CONFIG_FILE_NAME)
}

pub fn default_config_file() -> PathBuf {
  config_dir().join(CONFIG_FILE_NAME)
}

pub fn default_log_file() -> PathBuf {
  cache_dir().join("tagmate.log")
}

/// Merge two TOML documents, merging values from `right` onto `left`.
///
/// Tables present on both sides are merged key by key, recursing up to
/// `merge_depth` levels. Everything else, arrays included, is taken from
/// `right`, so a workspace `allowed_selectors` list replaces the user's list
/// instead of extending it.
pub fn merge_toml_values(left: toml::Value, right: toml::Value, merge_depth: usize) -> toml::Value {
  use toml::Value;

  match (left, right) {
    (Value::Table(mut left_map), Value::Table(right_map)) if merge_depth > 0 => {
      for (rname, rvalue) in right_map {
        let merged_value = match left_map.remove(&rname) {
          Some(lvalue) => merge_toml_values(lvalue, rvalue, merge_depth - 1),
          None => rvalue,
        };
        left_map.insert(rname, merged_value);
      }
      Value::Table(left_map)
    },
    (_, value) => value,
  }
}

/// Finds the current workspace folder.
///
/// This function starts searching the FS upward from the CWD and returns the
/// first directory that contains either `.git`, `.svn`, `.jj` or a
/// `.tagmate.toml`. If no workspace was found returns (CWD, true).
/// Otherwise (workspace, false) is returned
pub fn find_workspace() -> (PathBuf, bool) {
  match std::env::current_dir() {
    Ok(current_dir) => find_workspace_in(current_dir),
    Err(_) => (PathBuf::new(), true),
  }
}

pub fn find_workspace_in(dir: impl AsRef<Path>) -> (PathBuf, bool) {
  let dir = dir.as_ref();
  for ancestor in dir.ancestors() {
    if ancestor.join(".git").exists()
      || ancestor.join(".svn").exists()
      || ancestor.join(".jj").exists()
      || ancestor.join(WORKSPACE_CONFIG_FILE_NAME).exists()
    {
      return (ancestor.to_owned(), false);
    }
  }

  (dir.to_owned(), true)
}

pub fn ensure_parent_dir(path: &Path) {
  if let Some(parent) = path.parent()
    && !parent.exists()
  {
    std::fs::create_dir_all(parent).ok();
  }
}
