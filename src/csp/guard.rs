use parking_lot::Condvar;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::time::Instant;
use triomphe::Arc;

use crate::error::CspError;

// -----------------------------------------------------------------------------
// Guard
// -----------------------------------------------------------------------------

/// An entity an [`Alt`] can wait on.
///
/// The alternation protocol only ever needs four operations:
///
/// 1. [`enable`]: register interest without blocking
/// 2. [`is_selectable`]: poll readiness without committing
/// 3. [`disable`]: withdraw interest if the guard did not win
/// 4. [`select`]: commit to the guard and complete its handshake
///
/// Guards wake a waiting alternation through the [`AltSignal`] passed to
/// [`enable`]; the alternation never polls in a loop.
///
/// [`Alt`]: crate::csp::Alt
/// [`enable`]: Guard::enable
/// [`is_selectable`]: Guard::is_selectable
/// [`disable`]: Guard::disable
/// [`select`]: Guard::select
pub trait Guard {
  /// The payload produced when the guard is selected.
  type Output;

  /// Registers `signal` as a pending alternative.
  fn enable(&self, signal: &AltSignal);

  /// Withdraws a registration made by [`Guard::enable`].
  ///
  /// Disabling a guard that was never enabled, or that already fired, is a
  /// no-op.
  fn disable(&self, signal: &AltSignal);

  /// Returns `true` if [`Guard::select`] would complete without blocking.
  fn is_selectable(&self) -> bool;

  /// Commits to this guard and returns its payload.
  fn select(&self) -> Result<Self::Output, CspError>;

  /// Returns `true` if the guard can still become selectable.
  fn is_usable(&self) -> bool;

  /// Returns the instant at which the guard becomes selectable on its own,
  /// without any peer signalling it.
  #[inline]
  fn deadline(&self) -> Option<Instant> {
    None
  }
}

// -----------------------------------------------------------------------------
// Poison
// -----------------------------------------------------------------------------

/// An entity that can be irrevocably poisoned.
///
/// Processes hold linked `Poison` handles and poison them when their body
/// exits abnormally, spreading shutdown through the channel network.
pub trait Poison: Send + Sync {
  /// Poisons `self`. Idempotent.
  fn poison(&self);

  /// Returns `true` if `self` has been poisoned.
  fn is_poisoned(&self) -> bool;
}

// -----------------------------------------------------------------------------
// Alt Signal
// -----------------------------------------------------------------------------

/// Wake-up flag shared between an alternation and its enabled guards.
///
/// Any number of notifications during a round collapse into a single
/// wake-up, so a waiting alternation observes each round's readiness exactly
/// once before re-polling its guards.
#[derive(Clone)]
pub struct AltSignal {
  inner: Arc<SignalData>,
}

struct SignalData {
  fired: Mutex<bool>,
  cond: Condvar,
}

impl AltSignal {
  /// Creates a new, unfired signal.
  pub fn new() -> Self {
    Self {
      inner: Arc::new(SignalData {
        fired: Mutex::new(false),
        cond: Condvar::new(),
      }),
    }
  }

  /// Wakes the alternation waiting on this signal.
  pub fn notify(&self) {
    let mut fired = self.inner.fired.lock();

    if !*fired {
      *fired = true;
      self.inner.cond.notify_one();
    }
  }

  /// Returns `true` if the signal fired since the last reset.
  #[inline]
  pub fn is_fired(&self) -> bool {
    *self.inner.fired.lock()
  }

  /// Clears any pending notification.
  #[inline]
  pub(crate) fn reset(&self) {
    *self.inner.fired.lock() = false;
  }

  /// Blocks until the signal fires or `deadline` passes, then clears it.
  ///
  /// Returns `true` if the signal fired.
  pub(crate) fn wait(&self, deadline: Option<Instant>) -> bool {
    let mut fired = self.inner.fired.lock();

    while !*fired {
      match deadline {
        Some(deadline) => {
          if self.inner.cond.wait_until(&mut fired, deadline).timed_out() {
            break;
          }
        }
        None => self.inner.cond.wait(&mut fired),
      }
    }

    let result: bool = *fired;
    *fired = false;
    result
  }

  /// Returns `true` if both handles refer to the same signal.
  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }
}

impl Default for AltSignal {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

impl Debug for AltSignal {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("AltSignal")
      .field("fired", &self.is_fired())
      .finish()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
