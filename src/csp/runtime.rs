use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use triomphe::Arc;

use crate::consts;
use crate::core::Pid;
use crate::core::ProcTable;
use crate::csp::Process;
use crate::csp::ProcessConfig;
use crate::csp::ProcessInfo;
use crate::error::CspError;
use crate::proc::ProcData;
use crate::proc::ProcTableRef;

// -----------------------------------------------------------------------------
// Runtime
// -----------------------------------------------------------------------------

/// An explicit registry of running processes.
///
/// Processes created through a runtime are registered in its process table
/// from the moment they start until they terminate, and inherit the
/// runtime's thread options. Processes created with [`Process::new`] are not
/// tracked by any runtime.
pub struct Runtime {
  table: ProcTableRef,
  config: RuntimeConfig,
}

impl Runtime {
  /// Creates a new runtime with default options.
  #[inline]
  pub fn new() -> Self {
    Self::with_config(RuntimeConfig::new())
  }

  /// Creates a new runtime with the given options.
  pub fn with_config(config: RuntimeConfig) -> Self {
    Self {
      table: Arc::new(ProcTable::with_capacity(config.rt_max_processes)),
      config,
    }
  }

  /// Creates a new process tracked by this runtime.
  #[inline]
  pub fn process<F>(&self, body: F) -> Process
  where
    F: FnOnce() -> Result<(), CspError> + Send + 'static,
  {
    self.process_opt(body, ProcessConfig::new())
  }

  /// Creates a new process tracked by this runtime, with the given options.
  pub fn process_opt<F>(&self, body: F, config: ProcessConfig) -> Process
  where
    F: FnOnce() -> Result<(), CspError> + Send + 'static,
  {
    Process::create(
      Box::new(body),
      config,
      self.config.rt_thread_stack_size,
      &self.config.rt_thread_name_prefix,
      Some(Arc::clone(&self.table)),
    )
  }

  /// Returns the identifiers of every running process, in ascending order.
  #[inline]
  pub fn list(&self) -> Vec<Pid> {
    self.table.keys()
  }

  /// Returns a snapshot of the running process `pid`.
  pub fn info(&self, pid: Pid) -> Option<ProcessInfo> {
    let data: Arc<ProcData> = self.table.with(pid, Arc::clone).ok()?;
    Some(ProcessInfo::new(&data))
  }

  /// Returns the number of running processes.
  #[inline]
  pub fn len(&self) -> usize {
    self.table.len()
  }

  /// Returns `true` if no process is running.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.table.is_empty()
  }

  /// Returns the runtime options.
  #[inline]
  pub fn config(&self) -> &RuntimeConfig {
    &self.config
  }
}

impl Default for Runtime {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

impl Debug for Runtime {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("Runtime")
      .field("table", &self.table)
      .field("config", &self.config)
      .finish()
  }
}

// -----------------------------------------------------------------------------
// Runtime Config
// -----------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
  // ---------------------------------------------------------------------------
  // Process Thread Configuration
  // ---------------------------------------------------------------------------
  pub rt_max_processes: usize,
  pub rt_thread_name_prefix: String,
  pub rt_thread_stack_size: usize,
  // ---------------------------------------------------------------------------
  // Tracing Subscriber Configuration
  // ---------------------------------------------------------------------------
  pub tracing_source_file: bool,
  pub tracing_source_line: bool,
  pub tracing_source_name: bool,
  pub tracing_thread_info: bool,
  pub tracing_verbose: bool,
  pub tracing_very_verbose: bool,
}

impl RuntimeConfig {
  #[inline]
  pub fn new() -> Self {
    Self {
      rt_max_processes: consts::CAP_REGISTERED_PROCS,
      rt_thread_name_prefix: consts::DEFAULT_THREAD_NAME_PREFIX.to_owned(),
      rt_thread_stack_size: consts::DEFAULT_THREAD_STACK_SIZE,
      tracing_source_file: false,
      tracing_source_line: false,
      tracing_source_name: false,
      tracing_thread_info: true,
      tracing_verbose: true,
      tracing_very_verbose: false,
    }
  }

  #[inline]
  pub const fn tracing_filter(&self) -> tracing::Level {
    if self.tracing_very_verbose {
      tracing::Level::TRACE
    } else if self.tracing_verbose {
      tracing::Level::DEBUG
    } else {
      tracing::Level::INFO
    }
  }
}

impl Default for RuntimeConfig {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
