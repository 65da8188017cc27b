use parking_lot::Mutex;
use parking_lot::MutexGuard;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::thread;
use std::time::Duration;
use std::time::Instant;
use triomphe::Arc;

use crate::csp::AltSignal;
use crate::csp::Guard;
use crate::error::CspError;

/// A guard that becomes selectable once an armed alarm elapses.
///
/// An alarm is one-shot: selecting the guard disarms it. An unarmed timer
/// never becomes selectable, so an alternation holding only unarmed timers
/// (and no usable channels) is exhausted.
///
/// Arming or disarming the timer wakes every alternation it is enabled in,
/// so a waiting alternation picks up the new deadline.
#[derive(Clone)]
pub struct TimerGuard {
  inner: Arc<Mutex<TimerState>>,
}

struct TimerState {
  alarm: Option<Instant>,
  alts: Vec<AltSignal>,
}

impl TimerState {
  fn notify(&self) {
    for signal in self.alts.iter() {
      signal.notify();
    }
  }
}

impl TimerGuard {
  /// Creates a new, unarmed timer.
  pub fn new() -> Self {
    Self {
      inner: Arc::new(Mutex::new(TimerState {
        alarm: None,
        alts: Vec::new(),
      })),
    }
  }

  /// Arms the alarm to go off `duration` from now.
  ///
  /// Re-arming replaces any previous deadline.
  pub fn set_alarm(&self, duration: Duration) {
    let mut state: MutexGuard<'_, TimerState> = self.inner.lock();

    state.alarm = Some(Instant::now() + duration);
    state.notify();
  }

  /// Returns the armed deadline, if any.
  #[inline]
  pub fn alarm(&self) -> Option<Instant> {
    self.inner.lock().alarm
  }

  /// Disarms the alarm.
  pub fn disarm(&self) {
    let mut state: MutexGuard<'_, TimerState> = self.inner.lock();

    if state.alarm.take().is_some() {
      state.notify();
    }
  }

  /// Returns the current time.
  #[inline]
  pub fn read(&self) -> Instant {
    Instant::now()
  }

  /// Blocks the calling thread for `duration`.
  #[inline]
  pub fn sleep(&self, duration: Duration) {
    thread::sleep(duration);
  }
}

impl Guard for TimerGuard {
  type Output = ();

  fn enable(&self, signal: &AltSignal) {
    let mut state: MutexGuard<'_, TimerState> = self.inner.lock();

    if !state.alts.iter().any(|other| other.ptr_eq(signal)) {
      state.alts.push(signal.clone());
    }
  }

  fn disable(&self, signal: &AltSignal) {
    self.inner.lock().alts.retain(|other| !other.ptr_eq(signal));
  }

  fn is_selectable(&self) -> bool {
    self.alarm().is_some_and(|deadline| Instant::now() >= deadline)
  }

  /// Blocks until the armed deadline, then disarms the timer.
  ///
  /// Returns [`CspError::Exhausted`] if the timer is unarmed, since it would
  /// otherwise never fire.
  fn select(&self) -> Result<(), CspError> {
    let Some(deadline) = self.inner.lock().alarm.take() else {
      return Err(CspError::Exhausted);
    };

    let now: Instant = Instant::now();

    if deadline > now {
      thread::sleep(deadline - now);
    }

    Ok(())
  }

  #[inline]
  fn is_usable(&self) -> bool {
    self.alarm().is_some()
  }

  #[inline]
  fn deadline(&self) -> Option<Instant> {
    self.alarm()
  }
}

impl Default for TimerGuard {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

impl Debug for TimerGuard {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("TimerGuard")
      .field("alarm", &self.alarm())
      .finish()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
