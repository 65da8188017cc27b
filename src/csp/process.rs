use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;
use std::time::Instant;
use triomphe::Arc;

use crate::consts::DEFAULT_THREAD_NAME_PREFIX;
use crate::consts::DEFAULT_THREAD_STACK_SIZE;
use crate::core::Pid;
use crate::csp::Exit;
use crate::csp::Poison;
use crate::error::CspError;
use crate::proc::ProcBody;
use crate::proc::ProcData;
use crate::proc::ProcReadOnly;
use crate::proc::ProcTableRef;
use crate::proc::ProcTask;
use crate::raise;
use crate::utils;

// -----------------------------------------------------------------------------
// Process State
// -----------------------------------------------------------------------------

/// The lifecycle stage of a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProcessState {
  /// Created, not yet started.
  Ready,
  /// The body is executing.
  Running,
  /// The body returned or panicked.
  Terminated,
}

impl Display for ProcessState {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self {
      Self::Ready => f.write_str("ready"),
      Self::Running => f.write_str("running"),
      Self::Terminated => f.write_str("terminated"),
    }
  }
}

// -----------------------------------------------------------------------------
// Process Config
// -----------------------------------------------------------------------------

/// Per-process spawn options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessConfig {
  /// Thread name. Defaults to `{prefix}-{pid}`.
  pub name: Option<String>,
  /// Thread stack size in bytes.
  pub stack_size: Option<usize>,
}

impl ProcessConfig {
  /// Creates a new `ProcessConfig` with default options.
  #[inline]
  pub const fn new() -> Self {
    Self {
      name: None,
      stack_size: None,
    }
  }

  /// Sets the process name.
  #[inline]
  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  /// Sets the thread stack size.
  #[inline]
  pub fn stack_size(mut self, stack_size: usize) -> Self {
    self.stack_size = Some(stack_size);
    self
  }
}

// -----------------------------------------------------------------------------
// Process Info
// -----------------------------------------------------------------------------

/// A snapshot of a process, as reported by [`Runtime::info`].
///
/// [`Runtime::info`]: crate::csp::Runtime::info
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessInfo {
  pub pid: Pid,
  pub name: Option<String>,
  pub state: ProcessState,
  pub stopping: bool,
  /// Number of linked channels.
  pub links: usize,
}

impl ProcessInfo {
  pub(crate) fn new(data: &ProcData) -> Self {
    let internal = data.internal.lock();

    Self {
      pid: data.readonly.pid,
      name: data.readonly.name.clone(),
      state: internal.state,
      stopping: data.is_stopping(),
      links: internal.links.len(),
    }
  }
}

// -----------------------------------------------------------------------------
// Process
// -----------------------------------------------------------------------------

/// A unit of execution with a body that communicates through channels.
///
/// A process is created [`Ready`], becomes [`Running`] when started, and is
/// [`Terminated`] exactly when its body returns or panics. The body runs at
/// most once: either on a dedicated thread via [`start`], or on the calling
/// thread via [`run`].
///
/// `Process` is a cheap handle: clones refer to the same process.
///
/// # Failure
///
/// A body that returns an error or panics terminates only its own process.
/// Channels registered with [`link`] are poisoned when that happens, so the
/// failure spreads to peers as poison rather than as a hang.
///
/// [`Ready`]: ProcessState::Ready
/// [`Running`]: ProcessState::Running
/// [`Terminated`]: ProcessState::Terminated
/// [`start`]: Process::start
/// [`run`]: Process::run
/// [`link`]: Process::link
#[derive(Clone)]
pub struct Process {
  inner: Arc<ProcData>,
}

impl Process {
  /// Creates a new process with the given body.
  pub fn new<F>(body: F) -> Self
  where
    F: FnOnce() -> Result<(), CspError> + Send + 'static,
  {
    Self::with_config(body, ProcessConfig::new())
  }

  /// Creates a new process with the given body and options.
  pub fn with_config<F>(body: F, config: ProcessConfig) -> Self
  where
    F: FnOnce() -> Result<(), CspError> + Send + 'static,
  {
    Self::create(
      Box::new(body),
      config,
      DEFAULT_THREAD_STACK_SIZE,
      DEFAULT_THREAD_NAME_PREFIX,
      None,
    )
  }

  pub(crate) fn create(
    body: ProcBody,
    config: ProcessConfig,
    stack_size: usize,
    thread_prefix: &str,
    table: Option<ProcTableRef>,
  ) -> Self {
    let readonly: ProcReadOnly = ProcReadOnly {
      pid: Pid::next(),
      name: config.name,
      stack_size: config.stack_size.unwrap_or(stack_size),
      thread_prefix: thread_prefix.to_owned(),
    };

    Self {
      inner: Arc::new(ProcData::new(body, readonly, table)),
    }
  }

  // ---------------------------------------------------------------------------
  // Lifecycle
  // ---------------------------------------------------------------------------

  /// Starts the body on a new thread.
  ///
  /// # Panics
  ///
  /// Raises an `IllegalState` exception if the process was already started
  /// or run, and a `SysCap` exception if the thread cannot be spawned.
  pub fn start(&self) {
    let task: ProcTask = self.begin();

    let builder: thread::Builder = thread::Builder::new()
      .name(self.inner.readonly.thread_name())
      .stack_size(self.inner.readonly.stack_size);

    tracing::trace!(target: "csprt", pid = %self.pid(), "process spawned");

    let data: Arc<ProcData> = Arc::clone(&self.inner);

    // The body waits for its own handle so a joiner always finds it.
    let spawn = builder.spawn(move || {
      let mut internal = data.internal.lock();

      while internal.handle.is_none() {
        data.signal.wait(&mut internal);
      }

      drop(internal);
      drop(data);

      task.execute();
    });

    match spawn {
      Ok(handle) => {
        self.inner.internal.lock().handle = Some(handle);
        self.inner.signal.notify_all();
      }
      Err(error) => raise!(Error, SysCap, format!("failed to spawn process: {error}")),
    }
  }

  /// Runs the body to completion on the calling thread.
  ///
  /// # Panics
  ///
  /// Raises an `IllegalState` exception if the process was already started
  /// or run.
  pub fn run(&self) -> Exit {
    self.begin().execute()
  }

  fn begin(&self) -> ProcTask {
    let mut internal = self.inner.internal.lock();

    if internal.state != ProcessState::Ready {
      raise!(
        Error,
        IllegalState,
        format!("process {} is already {}", self.pid(), internal.state),
      );
    }

    let task: ProcTask = ProcTask::new(Arc::clone(&self.inner));

    internal.state = ProcessState::Running;

    task
  }

  /// Blocks until the process terminates and returns its exit reason.
  ///
  /// Returns `None` immediately if the process was never started.
  pub fn join(&self) -> Option<Exit> {
    let mut internal = self.inner.internal.lock();

    if internal.state == ProcessState::Ready {
      return None;
    }

    while internal.state != ProcessState::Terminated {
      self.inner.signal.wait(&mut internal);
    }

    let handle: Option<JoinHandle<()>> = internal.handle.take();
    let exit: Option<Exit> = internal.exit.clone();

    drop(internal);

    if let Some(handle) = handle {
      if handle.thread().id() != thread::current().id() {
        let _ignore = handle.join();
      }
    }

    exit
  }

  /// Blocks until the process terminates or `timeout` elapses.
  ///
  /// Returns `false` on timeout. A process that was never started is
  /// treated as joined.
  pub fn join_timeout(&self, timeout: Duration) -> bool {
    let deadline: Instant = Instant::now() + timeout;
    let mut internal = self.inner.internal.lock();

    if internal.state == ProcessState::Ready {
      return true;
    }

    while internal.state != ProcessState::Terminated {
      if self.inner.signal.wait_until(&mut internal, deadline).timed_out() {
        return internal.state == ProcessState::Terminated;
      }
    }

    true
  }

  /// Requests cooperative termination.
  ///
  /// Sets the stop flag observed by [`Process::stopping`], poisons every
  /// linked channel to unblock the body, and stops any child processes.
  #[inline]
  pub fn stop(&self) {
    self.inner.stop();
  }

  /// Links `item` to this process.
  ///
  /// Linked items are poisoned when the body exits abnormally or the
  /// process is stopped.
  pub fn link<P>(&self, item: &P)
  where
    P: Poison + Clone + 'static,
  {
    self.inner.internal.lock().links.push(Box::new(item.clone()));
  }

  /// Stops `child` whenever this process is stopped.
  pub(crate) fn adopt(&self, child: &Process) {
    self
      .inner
      .internal
      .lock()
      .children
      .push(Arc::clone(&child.inner));
  }

  // ---------------------------------------------------------------------------
  // Accessors
  // ---------------------------------------------------------------------------

  /// Returns the process identifier.
  #[inline]
  pub fn pid(&self) -> Pid {
    self.inner.readonly.pid
  }

  /// Returns the process name, if one was given.
  #[inline]
  pub fn name(&self) -> Option<&str> {
    self.inner.readonly.name.as_deref()
  }

  /// Returns the current lifecycle state.
  #[inline]
  pub fn state(&self) -> ProcessState {
    self.inner.internal.lock().state
  }

  /// Returns the exit reason, once terminated.
  #[inline]
  pub fn exit(&self) -> Option<Exit> {
    self.inner.internal.lock().exit.clone()
  }

  /// Returns `true` if [`Process::stop`] was called.
  #[inline]
  pub fn is_stopping(&self) -> bool {
    self.inner.is_stopping()
  }

  /// Returns a snapshot of the process.
  #[inline]
  pub fn info(&self) -> ProcessInfo {
    ProcessInfo::new(&self.inner)
  }

  // ---------------------------------------------------------------------------
  // Context
  // ---------------------------------------------------------------------------

  /// Suspends the calling thread for `duration`.
  #[inline]
  pub fn sleep(duration: Duration) {
    thread::sleep(duration);
  }

  /// Returns the process executing on the calling thread.
  #[inline]
  pub fn current() -> Option<Process> {
    utils::current().map(|inner| Self { inner })
  }

  /// Returns `true` if the process executing on the calling thread has been
  /// asked to stop.
  #[inline]
  pub fn stopping() -> bool {
    utils::current().is_some_and(|inner| inner.is_stopping())
  }
}

impl PartialEq for Process {
  #[inline]
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }
}

impl Eq for Process {}

impl Debug for Process {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("Process")
      .field("pid", &self.pid())
      .field("name", &self.name())
      .field("state", &self.state())
      .finish()
  }
}

impl Display for Process {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    Display::fmt(&self.pid(), f)
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use parking_lot::Mutex;
  use std::panic;
  use std::panic::AssertUnwindSafe;
  use std::sync::Arc;
  use std::thread;
  use std::time::Duration;

  use crate::core::Pid;
  use crate::csp::Channel;
  use crate::csp::Exit;
  use crate::csp::Process;
  use crate::csp::ProcessConfig;
  use crate::csp::ProcessState;
  use crate::error::CspError;

  #[test]
  fn test_run() {
    let proc: Process = Process::new(|| Ok(()));

    assert_eq!(proc.state(), ProcessState::Ready);
    assert_eq!(proc.run(), Exit::Normal);
    assert_eq!(proc.state(), ProcessState::Terminated);
    assert_eq!(proc.exit(), Some(Exit::Normal));
  }

  #[test]
  fn test_start_join() {
    let proc: Process = Process::new(|| Err(CspError::Poisoned));

    proc.start();

    assert_eq!(proc.join(), Some(Exit::Poisoned));
    assert_eq!(proc.state(), ProcessState::Terminated);
  }

  #[test]
  fn test_concurrent_join_reaps_thread() {
    for _ in 0..100 {
      let proc: Process = Process::new(|| Ok(()));

      thread::scope(|scope| {
        let joiner = scope.spawn(|| {
          while proc.state() == ProcessState::Ready {
            thread::yield_now();
          }

          proc.join()
        });

        proc.start();

        assert_eq!(joiner.join().unwrap(), Some(Exit::Normal));
      });

      assert!(proc.inner.internal.lock().handle.is_none());
    }
  }

  #[test]
  fn test_join_unstarted() {
    let proc: Process = Process::new(|| Ok(()));

    assert_eq!(proc.join(), None);
    assert!(proc.join_timeout(Duration::from_millis(1)));
  }

  #[test]
  fn test_join_timeout() {
    let chan: Channel<()> = Channel::new();
    let recv: Channel<()> = chan.clone();
    let proc: Process = Process::new(move || recv.read());

    proc.start();

    assert!(!proc.join_timeout(Duration::from_millis(20)));

    chan.poison();

    assert!(proc.join_timeout(Duration::from_secs(5)));
    assert_eq!(proc.exit(), Some(Exit::Poisoned));
  }

  #[test]
  fn test_restart_raises() {
    let proc: Process = Process::new(|| Ok(()));

    proc.run();

    assert!(panic::catch_unwind(AssertUnwindSafe(|| proc.start())).is_err());
    assert!(panic::catch_unwind(AssertUnwindSafe(|| proc.run())).is_err());
  }

  #[test]
  fn test_panic_exit() {
    let proc: Process = Process::new(|| panic!("bad body"));

    proc.start();

    assert_eq!(proc.join(), Some(Exit::Panic("bad body".into())));
  }

  #[test]
  fn test_panic_poisons_links() {
    let chan: Channel<u32> = Channel::new();
    let proc: Process = Process::new(|| panic!("bad body"));

    proc.link(&chan);
    proc.run();

    assert!(chan.is_poisoned());
  }

  #[test]
  fn test_stop_unblocks_body() {
    let chan: Channel<u32> = Channel::new();
    let recv: Channel<u32> = chan.clone();
    let proc: Process = Process::new(move || {
      let _item: u32 = recv.read()?;
      Ok(())
    });

    proc.link(&chan);
    proc.start();
    proc.stop();

    assert!(proc.is_stopping());
    assert_eq!(proc.join(), Some(Exit::Poisoned));
  }

  #[test]
  fn test_current() {
    let seen: Arc<Mutex<Option<Pid>>> = Arc::default();
    let save: Arc<Mutex<Option<Pid>>> = Arc::clone(&seen);

    let proc: Process = Process::new(move || {
      *save.lock() = Process::current().map(|proc| proc.pid());
      Ok(())
    });

    assert!(Process::current().is_none());
    assert!(!Process::stopping());
    assert_eq!(proc.run(), Exit::Normal);
    assert_eq!(*seen.lock(), Some(proc.pid()));
    assert!(Process::current().is_none());
  }

  #[test]
  fn test_config() {
    let config: ProcessConfig = ProcessConfig::new().name("worker").stack_size(64 * 1024);
    let proc: Process = Process::with_config(
      || {
        assert_eq!(std::thread::current().name(), Some("worker"));
        Ok(())
      },
      config,
    );

    assert_eq!(proc.name(), Some("worker"));

    proc.start();

    assert_eq!(proc.join(), Some(Exit::Normal));
  }
}
