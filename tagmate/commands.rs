use std::{
  fs::File,
  io::{
    self,
    BufReader,
    BufWriter,
    Write,
  },
  path::Path,
  process,
};

use anyhow::{
  Context,
  Result,
  bail,
};
use ropey::Rope;
use tagmate_lib::{
  config::{
    PhrasePolicy,
    TagConfig,
  },
  document::{
    Document,
    DocumentId,
  },
  position::{
    Position,
    char_idx_at_coords,
    coords_at_pos,
  },
  selection::Selection,
  session::TagSession,
};

use crate::cli::Targets;

const SETTINGS_HEADER: &str = "\
# tagmate settings
#
# allowed_extensions = [\"html\", \"xml\"]  # when set, only these files are eligible
";

fn open_document(path: &Path) -> Result<Document> {
  let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
  let text = Rope::from_reader(BufReader::new(file))
    .with_context(|| format!("failed to read {}", path.display()))?;
  Ok(Document::new(DocumentId::default(), text).with_path(path))
}

fn place_carets(doc: &mut Document, positions: &[Option<Position>]) -> Result<()> {
  let text = doc.text().slice(..);
  let carets: Vec<usize> = positions
    .iter()
    .map(|position| match position {
      Some(position) => char_idx_at_coords(text, *position),
      None => text.len_chars(),
    })
    .collect();
  doc.set_selection(Selection::carets(carets)?)?;
  Ok(())
}

/// Print the document, or save it over its file when `write` is set, then
/// report the caret as `line:col` on stderr.
fn finish(session: TagSession, write: bool) -> Result<()> {
  let doc = session.into_document();
  if write {
    let path = doc.path().context("document has no path")?;
    let file = File::create(path).with_context(|| format!("failed to write {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    doc.text().write_to(&mut writer)?;
    writer.flush()?;
  } else {
    let mut stdout = io::stdout().lock();
    doc.text().write_to(&mut stdout)?;
    stdout.flush()?;
  }

  let caret = coords_at_pos(doc.text().slice(..), doc.selection().first().head);
  eprintln!(
    "{}: caret at {}:{}",
    doc.display_name(),
    caret.row + 1,
    caret.col + 1
  );
  Ok(())
}

pub fn wrap(
  targets: Targets,
  policy: Option<PhrasePolicy>,
  write: bool,
  mut config: TagConfig,
) -> Result<()> {
  if let Some(policy) = policy {
    config.phrase_policy = policy;
  }

  for (path, positions) in targets {
    let mut doc = open_document(&path)?;
    place_carets(&mut doc, &positions)?;
    let mut session = TagSession::new(doc, config.clone());

    if !session.wrap() {
      log::info!("nothing to wrap in {}", path.display());
      eprintln!("{}: nothing to wrap", path.display());
    }
    finish(session, write)?;
  }
  Ok(())
}

pub fn type_text(
  path: &Path,
  position: Option<Position>,
  text: &str,
  write: bool,
  config: TagConfig,
) -> Result<()> {
  let mut doc = open_document(path)?;
  place_carets(&mut doc, &[position])?;
  let mut session = TagSession::new(doc, config);

  session.type_text(text)?;
  session.tick();
  finish(session, write)
}

/// Open the user config in an editor, creating it with the defaults first.
pub fn settings(config_file: &Path) -> Result<()> {
  if !config_file.exists() {
    tagmate_loader::ensure_parent_dir(config_file);
    let defaults = TagConfig::default().to_toml_string()?;
    std::fs::write(config_file, format!("{SETTINGS_HEADER}\n{defaults}"))
      .with_context(|| format!("failed to create {}", config_file.display()))?;
    log::info!("created {}", config_file.display());
  }

  let Some(editor) = std::env::var_os("VISUAL").or_else(|| std::env::var_os("EDITOR")) else {
    println!("{}", config_file.display());
    return Ok(());
  };

  let status = process::Command::new(&editor)
    .arg(config_file)
    .status()
    .with_context(|| format!("failed to run {}", editor.to_string_lossy()))?;
  if !status.success() {
    bail!("{} exited with {status}", editor.to_string_lossy());
  }
  Ok(())
}
