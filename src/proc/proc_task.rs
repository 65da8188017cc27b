use std::ops::Deref;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use triomphe::Arc;

use crate::csp::Exit;
use crate::csp::ProcessState;
use crate::error::CspError;
use crate::error::fatal;
use crate::proc::ProcData;
use crate::raise;
use crate::utils::ContextGuard;
use crate::utils::measure_fn;

/// A running process that finalizes itself on drop.
///
/// # Drop Behavior
///
/// Records a panic exit if none was recorded, marks the process terminated,
/// removes it from its process table, and wakes every joiner.
#[derive(Debug)]
#[repr(transparent)]
pub(crate) struct ProcTask {
  inner: Arc<ProcData>,
}

impl ProcTask {
  /// Registers `inner` with its process table.
  ///
  /// # Panics
  ///
  /// Raises a `SysCap` exception if the process table is full.
  pub(crate) fn new(inner: Arc<ProcData>) -> Self {
    if let Some(table) = inner.table.as_ref() {
      if table.insert(inner.readonly.pid, Arc::clone(&inner)).is_err() {
        raise!(Error, SysCap, "too many processes");
      }
    }

    Self { inner }
  }

  /// Runs the process body on the calling thread and returns its exit reason.
  pub(crate) fn execute(self) -> Exit {
    let _context: ContextGuard = ContextGuard::enter(Arc::clone(&self.inner));

    let Some(body) = self.inner.internal.lock().body.take() else {
      fatal!("process body missing at start");
    };

    tracing::trace!(target: "csprt", pid = %self.readonly.pid, "process running");

    let (result, elapsed): (Result<Result<(), CspError>, _>, Duration) =
      measure_fn(|| panic::catch_unwind(AssertUnwindSafe(body)));

    let exit: Exit = match result {
      Ok(result) => Exit::from(result),
      Err(payload) => Exit::from_panic(payload),
    };

    if exit.is_abnormal() {
      self.inner.poison_links();
    }

    tracing::debug!(
      target: "csprt",
      pid = %self.readonly.pid,
      exit = %exit,
      elapsed = ?elapsed,
      "process terminated"
    );

    self.inner.internal.lock().exit = Some(exit.clone());

    exit
  }
}

impl Drop for ProcTask {
  fn drop(&mut self) {
    if let Some(table) = self.inner.table.as_ref() {
      table.remove(self.inner.readonly.pid);
    }

    let mut internal = self.inner.internal.lock();

    if internal.exit.is_none() {
      internal.exit = Some(Exit::Panic("process terminated before completion".into()));
    }

    internal.state = ProcessState::Terminated;

    self.inner.signal.notify_all();
  }
}

impl Deref for ProcTask {
  type Target = ProcData;

  #[inline]
  fn deref(&self) -> &Self::Target {
    &self.inner
  }
}
