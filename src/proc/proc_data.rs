use parking_lot::Condvar;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;
use triomphe::Arc;

use crate::consts::CAP_PROC_LINKS;
use crate::core::Pid;
use crate::core::ProcTable;
use crate::csp::Exit;
use crate::csp::Poison;
use crate::csp::ProcessState;
use crate::error::CspError;

/// The body executed by a process.
pub(crate) type ProcBody = Box<dyn FnOnce() -> Result<(), CspError> + Send + 'static>;

/// The process table a process registers with while it runs.
pub(crate) type ProcTableRef = Arc<ProcTable<Arc<ProcData>>>;

// -----------------------------------------------------------------------------
// Proc Data
// -----------------------------------------------------------------------------

/// Top-level process data container.
pub(crate) struct ProcData {
  pub(crate) readonly: ProcReadOnly,
  pub(crate) internal: Mutex<ProcInternal>,
  /// Notified whenever `internal.state` becomes terminated.
  pub(crate) signal: Condvar,
  pub(crate) stopping: AtomicBool,
  pub(crate) table: Option<ProcTableRef>,
}

impl ProcData {
  pub(crate) fn new(body: ProcBody, readonly: ProcReadOnly, table: Option<ProcTableRef>) -> Self {
    Self {
      readonly,
      internal: Mutex::new(ProcInternal::new(body)),
      signal: Condvar::new(),
      stopping: AtomicBool::new(false),
      table,
    }
  }

  /// Poisons every linked channel.
  pub(crate) fn poison_links(&self) {
    for link in self.internal.lock().links.iter() {
      link.poison();
    }
  }

  /// Requests cooperative termination of this process and its children.
  pub(crate) fn stop(&self) {
    if self.stopping.swap(true, Ordering::AcqRel) {
      return;
    }

    tracing::debug!(target: "csprt", pid = %self.readonly.pid, "process stopping");

    self.poison_links();

    let children: Vec<Arc<ProcData>> = self.internal.lock().children.clone();

    for child in children {
      child.stop();
    }
  }

  #[inline]
  pub(crate) fn is_stopping(&self) -> bool {
    self.stopping.load(Ordering::Acquire)
  }
}

impl Debug for ProcData {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("ProcData")
      .field("readonly", &self.readonly)
      .field("state", &self.internal.lock().state)
      .field("stopping", &self.is_stopping())
      .finish_non_exhaustive()
  }
}

// -----------------------------------------------------------------------------
// Proc Read-only
// -----------------------------------------------------------------------------

/// Immutable process data, set once at creation.
#[derive(Debug)]
pub(crate) struct ProcReadOnly {
  pub(crate) pid: Pid,
  pub(crate) name: Option<String>,
  pub(crate) stack_size: usize,
  pub(crate) thread_prefix: String,
}

impl ProcReadOnly {
  /// Returns the name given to the thread running this process.
  pub(crate) fn thread_name(&self) -> String {
    match self.name.as_deref() {
      Some(name) => name.to_owned(),
      None => format!("{}-{}", self.thread_prefix, self.pid.as_u64()),
    }
  }
}

// -----------------------------------------------------------------------------
// Proc Internal
// -----------------------------------------------------------------------------

/// Mutable process lifecycle state.
pub(crate) struct ProcInternal {
  pub(crate) state: ProcessState,
  pub(crate) exit: Option<Exit>,
  pub(crate) body: Option<ProcBody>,
  pub(crate) handle: Option<JoinHandle<()>>,
  /// Channels poisoned when the body exits abnormally or is stopped.
  pub(crate) links: Vec<Box<dyn Poison>>,
  /// Processes stopped together with this one.
  pub(crate) children: Vec<Arc<ProcData>>,
}

impl ProcInternal {
  fn new(body: ProcBody) -> Self {
    Self {
      state: ProcessState::Ready,
      exit: None,
      body: Some(body),
      handle: None,
      links: Vec::with_capacity(CAP_PROC_LINKS),
      children: Vec::new(),
    }
  }
}
