use std::{
  fmt,
  path::{
    Path,
    PathBuf,
  },
};

use anyhow::{
  Result,
  bail,
};
use clap::{
  ArgAction,
  Parser,
  Subcommand,
  ValueEnum,
};
use indexmap::IndexMap;
use tagmate_lib::{
  config::PhrasePolicy,
  position::Position,
};

#[derive(Clone, Debug)]
pub struct CliOptions {
  pub verbosity:   u8,
  pub log_file:    Option<PathBuf>,
  pub config_file: Option<PathBuf>,
  pub command:     Command,
}

/// A caret position per file. `None` means the end of the file.
pub type Targets = IndexMap<PathBuf, Vec<Option<Position>>>;

#[derive(Clone, Debug)]
pub enum Command {
  Wrap {
    targets: Targets,
    policy:  Option<PhrasePolicy>,
    write:   bool,
  },
  Type {
    file:     PathBuf,
    position: Option<Position>,
    text:     String,
    write:    bool,
  },
  Settings,
}

impl CliOptions {
  pub fn parse() -> Result<Self> {
    let raw = RawCli::parse();
    raw.try_into()
  }
}

#[derive(Parser, Debug)]
#[command(name = "tagmate", version, about, long_about = None)]
struct RawCli {
  /// Increase logging verbosity (repeat for more detail)
  #[arg(short = 'v', action = ArgAction::Count, global = true)]
  verbosity: u8,

  /// Save logs to a specific file
  #[arg(long = "log", value_name = "FILE", global = true)]
  log_file: Option<PathBuf>,

  /// Load configuration from a specific file
  #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
  config_file: Option<PathBuf>,

  #[command(subcommand)]
  command: RawCommand,
}

#[derive(Subcommand, Debug)]
enum RawCommand {
  /// Wrap the phrase at each position in a matching tag pair
  Wrap {
    /// Files with optional :line[:col] caret positions (default: end of file)
    #[arg(value_name = "FILE[:LINE[:COL]]", required = true)]
    targets: Vec<String>,

    /// How a caret picks its phrase
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Write the result back instead of printing it
    #[arg(long)]
    write: bool,
  },
  /// Type text at a position, closing opening tags as they are completed
  Type {
    /// File with an optional :line[:col] caret position
    #[arg(value_name = "FILE[:LINE[:COL]]")]
    target: String,

    /// Text to type
    text: String,

    /// Write the result back instead of printing it
    #[arg(long)]
    write: bool,
  },
  /// Open the user configuration file in $VISUAL or $EDITOR
  Settings,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PolicyArg {
  LinePrefix,
  LastWord,
}

impl fmt::Display for PolicyArg {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::LinePrefix => write!(f, "line-prefix"),
      Self::LastWord => write!(f, "last-word"),
    }
  }
}

impl From<PolicyArg> for PhrasePolicy {
  fn from(arg: PolicyArg) -> Self {
    match arg {
      PolicyArg::LinePrefix => PhrasePolicy::LinePrefix,
      PolicyArg::LastWord => PhrasePolicy::LastWord,
    }
  }
}

impl TryFrom<RawCli> for CliOptions {
  type Error = anyhow::Error;

  fn try_from(raw: RawCli) -> Result<Self> {
    let command = match raw.command {
      RawCommand::Wrap {
        targets,
        policy,
        write,
      } => {
        let mut files = Targets::new();
        for target in &targets {
          insert_file_argument(&mut files, target);
        }
        Command::Wrap {
          targets: files,
          policy: policy.map(PhrasePolicy::from),
          write,
        }
      },
      RawCommand::Type {
        target,
        text,
        write,
      } => {
        if text.is_empty() {
          bail!("nothing to type");
        }
        let (file, position) = parse_file(&target);
        Command::Type {
          file,
          position,
          text,
          write,
        }
      },
      RawCommand::Settings => Command::Settings,
    };

    Ok(CliOptions {
      verbosity: raw.verbosity,
      log_file: raw.log_file,
      config_file: raw.config_file,
      command,
    })
  }
}

fn insert_file_argument(files: &mut Targets, argument: &str) {
  let (path, position) = parse_file(argument);
  files
    .entry(path)
    .and_modify(|positions| positions.push(position))
    .or_insert_with(|| vec![position]);
}

fn parse_file(argument: &str) -> (PathBuf, Option<Position>) {
  let default_position = || (PathBuf::from(argument), None);

  if Path::new(argument).exists() {
    return default_position();
  }

  split_path_row_col(argument)
    .or_else(|| split_path_row(argument))
    .map(|(path, position)| (path, Some(position)))
    .unwrap_or_else(default_position)
}

fn split_path_row_col(argument: &str) -> Option<(PathBuf, Position)> {
  let mut parts = argument.trim_end_matches(':').rsplitn(3, ':');
  let col: usize = parts.next()?.parse().ok()?;
  let row: usize = parts.next()?.parse().ok()?;
  let path = parts.next()?.into();
  let position = Position::new(row.saturating_sub(1), col.saturating_sub(1));
  Some((path, position))
}

/// A bare line number puts the caret at the end of that line.
fn split_path_row(argument: &str) -> Option<(PathBuf, Position)> {
  let (path, row) = argument.trim_end_matches(':').rsplit_once(':')?;
  let row: usize = row.parse().ok()?;
  let position = Position::new(row.saturating_sub(1), usize::MAX);
  Some((path.into(), position))
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn parse_file_positions() {
    assert_eq!(
      parse_file("page.html:3:5"),
      (PathBuf::from("page.html"), Some(Position::new(2, 4)))
    );
    assert_eq!(
      parse_file("page.html:3"),
      (PathBuf::from("page.html"), Some(Position::new(2, usize::MAX)))
    );
    assert_eq!(parse_file("page.html"), (PathBuf::from("page.html"), None));
    assert_eq!(
      parse_file("page.html:x:1"),
      (PathBuf::from("page.html:x"), Some(Position::new(0, usize::MAX)))
    );
  }

  #[test]
  fn wrap_targets_group_by_file() {
    let raw = RawCli::parse_from([
      "tagmate", "-vv", "wrap", "a.html:1:4", "b.xml", "a.html:2", "--policy", "last-word",
    ]);
    let options = CliOptions::try_from(raw).unwrap();
    assert_eq!(options.verbosity, 2);

    let Command::Wrap {
      targets,
      policy,
      write,
    } = options.command
    else {
      panic!("expected wrap command");
    };
    assert_eq!(policy, Some(PhrasePolicy::LastWord));
    assert!(!write);
    assert_eq!(targets.len(), 2);
    assert_eq!(targets[&PathBuf::from("a.html")], vec![
      Some(Position::new(0, 3)),
      Some(Position::new(1, usize::MAX))
    ]);
    assert_eq!(targets[&PathBuf::from("b.xml")], vec![None]);
  }

  #[test]
  fn type_requires_text() {
    let raw = RawCli::parse_from(["tagmate", "type", "a.html", ""]);
    assert!(CliOptions::try_from(raw).is_err());
  }
}
