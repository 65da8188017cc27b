use parking_lot::Condvar;
use parking_lot::Mutex;
use parking_lot::MutexGuard;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use triomphe::Arc;

use crate::raise;

/// A reusable synchronization point for a dynamic set of participants.
///
/// Every enrolled participant calls [`synchronise`]; all of them block until
/// the last one arrives, after which the barrier resets for the next round.
///
/// `Barrier` is a cheap handle: clones refer to the same barrier.
///
/// [`synchronise`]: Barrier::synchronise
#[derive(Clone)]
pub struct Barrier {
  inner: Arc<BarrierData>,
}

struct BarrierData {
  state: Mutex<BarrierState>,
  cond: Condvar,
}

struct BarrierState {
  participants: usize,
  not_ready: usize,
  generation: u64,
}

impl BarrierState {
  fn release(&mut self, cond: &Condvar) {
    self.not_ready = self.participants;
    self.generation = self.generation.wrapping_add(1);
    cond.notify_all();
  }
}

impl Barrier {
  /// Creates a new barrier with `participants` enrolled participants.
  pub fn new(participants: usize) -> Self {
    Self {
      inner: Arc::new(BarrierData {
        state: Mutex::new(BarrierState {
          participants,
          not_ready: participants,
          generation: 0,
        }),
        cond: Condvar::new(),
      }),
    }
  }

  /// Resets the barrier to `participants` enrolled participants.
  pub fn reset(&self, participants: usize) {
    let mut state: MutexGuard<'_, BarrierState> = self.inner.state.lock();

    state.participants = participants;
    state.not_ready = participants;

    self.inner.cond.notify_all();
  }

  /// Enrols one more participant.
  pub fn enrol(&self) {
    let mut state: MutexGuard<'_, BarrierState> = self.inner.state.lock();

    state.participants += 1;
    state.not_ready += 1;

    self.inner.cond.notify_all();
  }

  /// Retires one participant, releasing the others if it was the last one
  /// outstanding.
  ///
  /// # Panics
  ///
  /// Raises an `IllegalState` exception if no participant is enrolled.
  pub fn retire(&self) {
    let mut state: MutexGuard<'_, BarrierState> = self.inner.state.lock();

    if state.participants == 0 || state.not_ready == 0 {
      raise!(Error, IllegalState, "no participant to retire");
    }

    state.participants -= 1;
    state.not_ready -= 1;

    if state.not_ready == 0 {
      state.release(&self.inner.cond);
    } else {
      self.inner.cond.notify_all();
    }
  }

  /// Blocks until every enrolled participant has called `synchronise`.
  ///
  /// # Panics
  ///
  /// Raises an `IllegalState` exception if no participant is enrolled.
  pub fn synchronise(&self) {
    let mut state: MutexGuard<'_, BarrierState> = self.inner.state.lock();
    self.arrive(&mut state);
  }

  /// Waits until exactly `participants` are enrolled, then synchronises.
  pub fn synchronise_with(&self, participants: usize) {
    let mut state: MutexGuard<'_, BarrierState> = self.inner.state.lock();

    while state.participants != participants {
      self.inner.cond.wait(&mut state);
    }

    self.arrive(&mut state);
  }

  fn arrive(&self, state: &mut MutexGuard<'_, BarrierState>) {
    if state.participants == 0 || state.not_ready == 0 {
      raise!(Error, IllegalState, "barrier has no enrolled participants");
    }

    state.not_ready -= 1;

    if state.not_ready == 0 {
      state.release(&self.inner.cond);
      return;
    }

    let generation: u64 = state.generation;

    while state.generation == generation {
      self.inner.cond.wait(state);
    }
  }

  /// Returns the number of enrolled participants.
  #[inline]
  pub fn participants(&self) -> usize {
    self.inner.state.lock().participants
  }
}

impl Debug for Barrier {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    let state: MutexGuard<'_, BarrierState> = self.inner.state.lock();

    f.debug_struct("Barrier")
      .field("participants", &state.participants)
      .field("not_ready", &state.not_ready)
      .finish()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
