use std::cell::RefCell;
use triomphe::Arc;

use crate::proc::ProcData;

thread_local! {
  static CURRENT: RefCell<Option<Arc<ProcData>>> = const { RefCell::new(None) };
}

/// Returns the process executing on the calling thread, if any.
#[inline]
pub(crate) fn current() -> Option<Arc<ProcData>> {
  CURRENT
    .try_with(|current| current.borrow().clone())
    .ok()
    .flatten()
}

/// Marks a process as the current process of the calling thread.
///
/// The previous context is restored when the guard is dropped, which keeps
/// nested synchronous runs (`Seq`) attributed to the innermost process.
#[must_use = "the context is reset when the guard is dropped"]
pub(crate) struct ContextGuard {
  previous: Option<Arc<ProcData>>,
}

impl ContextGuard {
  pub(crate) fn enter(data: Arc<ProcData>) -> Self {
    let previous: Option<Arc<ProcData>> = CURRENT
      .try_with(|current| current.replace(Some(data)))
      .ok()
      .flatten();

    Self { previous }
  }
}

impl Drop for ContextGuard {
  fn drop(&mut self) {
    let previous: Option<Arc<ProcData>> = self.previous.take();
    let _ignore = CURRENT.try_with(|current| current.replace(previous));
  }
}
