use crate::csp::Exit;
use crate::csp::Process;

/// Concurrent composition: every member runs on its own thread.
///
/// [`Par::start`] returns only once every member has terminated, so a member
/// that never terminates blocks its caller forever. Wrap the composition with
/// [`Par::into_process`] to bound the wait with [`Process::join_timeout`].
#[derive(Clone, Debug)]
pub struct Par {
  procs: Vec<Process>,
}

impl Par {
  /// Creates a new parallel composition.
  pub fn new<I>(procs: I) -> Self
  where
    I: IntoIterator<Item = Process>,
  {
    Self {
      procs: procs.into_iter().collect(),
    }
  }

  /// Starts every member and waits for all of them to terminate.
  ///
  /// Returns the exit reasons in declaration order. A failing member never
  /// affects its siblings.
  pub fn start(&self) -> Vec<Exit> {
    tracing::debug!(target: "csprt", len = self.procs.len(), "par started");

    for proc in self.procs.iter() {
      proc.start();
    }

    let exits: Vec<Exit> = self
      .procs
      .iter()
      .map(|proc| proc.join().unwrap_or_default())
      .collect();

    tracing::debug!(target: "csprt", len = self.procs.len(), "par finished");

    exits
  }

  /// Asks every member to stop.
  pub fn stop(&self) {
    for proc in self.procs.iter() {
      proc.stop();
    }
  }

  /// Wraps the composition as a single process.
  ///
  /// The process exits with the first abnormal member exit, in declaration
  /// order. Stopping it stops every member.
  pub fn into_process(self) -> Process {
    let members: Vec<Process> = self.procs.clone();

    let this: Process = Process::new(move || {
      self
        .start()
        .into_iter()
        .find(Exit::is_abnormal)
        .unwrap_or_default()
        .propagate()
    });

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
