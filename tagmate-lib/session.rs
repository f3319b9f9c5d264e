//! Per-document state tying the tag behaviors to edits.
//!
//! A [`TagSession`] plays the part of the host for one document: it applies
//! edits, delivers a modification notification after each one, and runs
//! deferred work on [`TagSession::tick`]. Deferred work is always flushed
//! before the next edit is applied.

use tracing::{
  debug,
  trace,
  warn,
};

use crate::{
  Tendril,
  auto_close::{
    CloseState,
    IN_PROGRESS_KEY,
    PendingClose,
    on_modified,
  },
  config::TagConfig,
  document::{
    Document,
    Result,
  },
  eligibility::is_document_eligible,
  idle::IdleQueue,
  insert::insert_text,
  selection::Selection,
  transaction::Transaction,
  wrap::wrap_selection,
};

#[derive(Debug)]
pub struct TagSession {
  doc:         Document,
  config:      TagConfig,
  close_state: CloseState,
  idle:        IdleQueue<TagSession>,
}

impl TagSession {
  pub fn new(doc: Document, config: TagConfig) -> Self {
    Self {
      doc,
      config,
      close_state: CloseState::Idle,
      idle: IdleQueue::new(),
    }
  }

  pub fn document(&self) -> &Document {
    &self.doc
  }

  pub fn into_document(self) -> Document {
    self.doc
  }

  pub fn config(&self) -> &TagConfig {
    &self.config
  }

  /// Settings may change between events; the next event sees the new ones.
  pub fn set_config(&mut self, config: TagConfig) {
    self.config = config;
  }

  pub fn close_state(&self) -> CloseState {
    self.close_state
  }

  /// Read a per-document boolean flag by name.
  pub fn flag(&self, key: &str) -> Option<bool> {
    (key == IN_PROGRESS_KEY).then(|| self.close_state.in_progress())
  }

  /// Number of deferred tasks waiting for the next tick.
  pub fn pending_tasks(&self) -> usize {
    self.idle.len()
  }

  pub fn is_eligible(&self) -> bool {
    is_document_eligible(&self.doc, &self.config)
  }

  pub fn set_selection(&mut self, selection: Selection) -> Result<()> {
    self.doc.set_selection(selection)
  }

  /// Wrap the phrase at every caret or selection. Returns whether the
  /// document changed.
  pub fn wrap(&mut self) -> bool {
    self.tick();
    if !self.is_eligible() {
      trace!(doc = %self.doc.display_name(), "wrap skipped, document not eligible");
      return false;
    }

    let tx = match wrap_selection(&self.doc, self.doc.selection(), self.config.phrase_policy) {
      Ok(Some(tx)) => tx,
      Ok(None) => return false,
      Err(err) => {
        warn!(%err, "failed to build wrap transaction");
        return false;
      },
    };

    if let Err(err) = self.doc.apply_transaction(&tx) {
      warn!(%err, "failed to apply wrap transaction");
      return false;
    }
    self.notify_modified();
    true
  }

  /// Type `text` one char at a time at every caret, the way a user would.
  pub fn type_text(&mut self, text: &str) -> Result<()> {
    for ch in text.chars() {
      self.tick();
      let mut fragment = Tendril::new();
      fragment.push(ch);
      let tx = Transaction::insert(self.doc.text(), self.doc.selection(), fragment)?;
      self.doc.apply_transaction(&tx)?;
      self.notify_modified();
    }
    Ok(())
  }

  /// Apply an arbitrary edit.
  pub fn edit(&mut self, transaction: &Transaction) -> Result<()> {
    self.tick();
    self.doc.apply_transaction(transaction)?;
    self.notify_modified();
    Ok(())
  }

  /// Run the deferred work queued so far. Returns how many tasks ran.
  pub fn tick(&mut self) -> usize {
    std::mem::take(&mut self.idle).run(self)
  }

  fn notify_modified(&mut self) {
    if !self.config.auto_close {
      return;
    }
    let eligible = self.is_eligible();
    let (state, pending) = on_modified(
      self.doc.text(),
      self.doc.selection(),
      self.close_state,
      eligible,
    );
    self.close_state = state;

    if let Some(pending) = pending {
      self
        .idle
        .schedule(move |session: &mut TagSession| session.complete_close(pending));
    }
  }

  fn complete_close(&mut self, pending: PendingClose) {
    let tag = pending.closing_tag();
    if insert_text(&mut self.doc, pending.pos, &tag) {
      // Delivered while in flight, so it cannot trigger another close.
      self.notify_modified();
      if let Err(err) = self.doc.set_selection(Selection::point(pending.pos)) {
        warn!(%err, "failed to place caret before closing tag");
      }
      debug!(pos = pending.pos, %tag, "closed tag");
    }
    self.close_state = CloseState::Idle;
  }
}
