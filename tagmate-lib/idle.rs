//! One-shot work deferred to the next idle tick.
//!
//! Work scheduled while handling a modification must not touch the document
//! inside that same notification. The host calls [`IdleQueue::run`] once the
//! notification has returned.

use std::collections::VecDeque;

type IdleTask<C> = Box<dyn FnOnce(&mut C)>;

pub struct IdleQueue<C> {
  tasks: VecDeque<IdleTask<C>>,
}

impl<C> Default for IdleQueue<C> {
  fn default() -> Self {
    Self {
      tasks: VecDeque::new(),
    }
  }
}

impl<C> std::fmt::Debug for IdleQueue<C> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("IdleQueue")
      .field("pending", &self.tasks.len())
      .finish()
  }
}

impl<C> IdleQueue<C> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn schedule(&mut self, task: impl FnOnce(&mut C) + 'static) {
    self.tasks.push_back(Box::new(task));
  }

  pub fn len(&self) -> usize {
    self.tasks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tasks.is_empty()
  }

  /// Run the tasks queued so far, in order. Returns how many ran.
  ///
  /// Consumes the queue, so a task that needs to schedule follow-up work
  /// does so on a fresh queue owned by the context and that work runs on the
  /// following tick.
  pub fn run(self, cx: &mut C) -> usize {
    let count = self.tasks.len();
    for task in self.tasks {
      task(cx);
    }
    count
  }
}
