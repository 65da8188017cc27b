use crate::csp::Exit;
use crate::csp::Process;

/// Sequential composition: members run one after another on the calling
/// thread, in declaration order.
#[derive(Clone, Debug)]
pub struct Seq {
  procs: Vec<Process>,
}

impl Seq {
  /// Creates a new sequential composition.
  pub fn new<I>(procs: I) -> Self
  where
    I: IntoIterator<Item = Process>,
  {
    Self {
      procs: procs.into_iter().collect(),
    }
  }

  /// Runs every member to completion, in order.
  ///
  /// Stops at the first member that exits abnormally and returns its exit
  /// reason; later members are left unstarted.
  pub fn start(&self) -> Exit {
    tracing::debug!(target: "csprt", len = self.procs.len(), "seq started");

    for (index, proc) in self.procs.iter().enumerate() {
      let exit: Exit = proc.run();

      if exit.is_abnormal() {
        tracing::debug!(target: "csprt", index, exit = %exit, "seq aborted");
        return exit;
      }
    }

    tracing::debug!(target: "csprt", len = self.procs.len(), "seq finished");

    Exit::Normal
  }

  /// Asks every member to stop.
  pub fn stop(&self) {
    for proc in self.procs.iter() {
      proc.stop();
    }
  }

  /// Wraps the composition as a single process.
  pub fn into_process(self) -> Process {
    let members: Vec<Process> = self.procs.clone();
    let this: Process = Process::new(move || self.start().propagate());

    for member in members.iter() {
      this.adopt(member);
    }

    this
  }

  /// Returns the number of members.
  #[inline]
  pub fn len(&self) -> usize {
    self.procs.len()
  }

  /// Returns `true` if the composition has no members.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.procs.is_empty()
  }

  /// Returns the members, in declaration order.
  #[inline]
  pub fn processes(&self) -> &[Process] {
    &self.procs
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
