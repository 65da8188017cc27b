use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;
use std::num::NonZeroU64;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::consts::MAX_PID;
use crate::error::fatal;

/// A process identifier.
///
/// Identifiers are allocated from a monotonic counter and are never reused
/// within the lifetime of the program.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Pid {
  inner: NonZeroU64,
}

impl Pid {
  /// Allocates the next unique process identifier.
  #[inline]
  pub(crate) fn next() -> Self {
    next_pid()
  }

  /// Returns this `Pid` as a numeric identifier.
  #[inline]
  pub const fn as_u64(&self) -> u64 {
    self.inner.get()
  }
}

impl Debug for Pid {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    Display::fmt(self, f)
  }
}

impl Display for Pid {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    write!(f, "#PID<{}>", self.inner)
  }
}

fn next_pid() -> Pid {
  static ID: AtomicU64 = AtomicU64::new(0);

  let mut last: u64 = ID.load(Ordering::Relaxed);

  'next: loop {
    let Some(id) = last.checked_add(1) else {
      exhausted();
    };

    if id > MAX_PID {
      exhausted();
    }

    match ID.compare_exchange_weak(last, id, Ordering::Relaxed, Ordering::Relaxed) {
      Ok(_) => {
        let Some(inner) = NonZeroU64::new(id) else {
          exhausted();
        };

        break 'next Pid { inner };
      }
      Err(next) => last = next,
    }
  }
}

#[cold]
fn exhausted() -> ! {
  fatal!("failed to generate unique process ID: bitspace exhausted")
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use hashbrown::HashSet;
  use std::thread;

  use crate::core::Pid;

  #[test]
  fn test_unique() {
    let a: Pid = Pid::next();
    let b: Pid = Pid::next();

    assert_ne!(a, b);
    assert!(b > a);
  }

  #[test]
  fn test_unique_across_threads() {
    let handles: Vec<_> = (0..8)
      .map(|_| thread::spawn(|| (0..128).map(|_| Pid::next()).collect::<Vec<Pid>>()))
      .collect();

    let mut seen: HashSet<Pid> = HashSet::new();

    for handle in handles {
      for pid in handle.join().unwrap() {
        assert!(seen.insert(pid), "duplicate pid: {pid}");
      }
    }
  }

  #[test]
  fn test_display() {
    let pid: Pid = Pid::next();
    assert_eq!(pid.to_string(), format!("#PID<{}>", pid.as_u64()));
  }
}
