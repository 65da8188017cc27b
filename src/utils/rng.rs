//! Pseudo-random numbers for random alternation.
//!
//! Selection only needs to be free of structural bias, so a xorshift64
//! generator seeded per alternation is sufficient. It is NOT
//! cryptographically secure.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;

#[derive(Clone, Debug)]
pub(crate) struct Rng {
  state: u64,
}

impl Rng {
  /// Creates a new generator with the given seed.
  ///
  /// A zero seed is replaced with `1`; xorshift never leaves the zero state.
  #[inline]
  pub(crate) const fn new(seed: u64) -> Self {
    Self {
      state: if seed == 0 { 1 } else { seed },
    }
  }

  /// Creates a new generator seeded from the clock and a process-wide
  /// counter, so generators created in the same instant still diverge.
  pub(crate) fn from_entropy() -> Self {
    static SEQ: AtomicU64 = AtomicU64::new(0x9E37_79B9_7F4A_7C15);

    let time: u64 = SystemTime::now()
      .duration_since(SystemTime::UNIX_EPOCH)
      .map_or(0, |time| time.as_nanos() as u64);
    let seq: u64 = SEQ.fetch_add(0x9E37_79B9_7F4A_7C15, Ordering::Relaxed);

    Self::new(splitmix64(time ^ seq))
  }

  pub(crate) fn next_u64(&mut self) -> u64 {
    let mut x: u64 = self.state;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    self.state = x;
    x
  }

  /// Returns a value in the range `[0, bound)`.
  ///
  /// # Panics
  ///
  /// Panics if `bound` is zero.
  pub(crate) fn next_usize(&mut self, bound: usize) -> usize {
    assert!(bound > 0, "bound must be non-zero");
    (self.next_u64() % bound as u64) as usize
  }
}

fn splitmix64(seed: u64) -> u64 {
  let mut z: u64 = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
  z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
  z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
  z ^ (z >> 31)
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
