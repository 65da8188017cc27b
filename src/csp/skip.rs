use crate::csp::AltSignal;
use crate::csp::Guard;
use crate::error::CspError;

/// A guard that is always selectable.
///
/// Placed last in a priority alternation, it turns the alternation into a
/// non-blocking poll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SkipGuard;

impl SkipGuard {
  /// Creates a new skip guard.
  #[inline]
  pub const fn new() -> Self {
    Self
  }
}

impl Guard for SkipGuard {
  type Output = ();

  #[inline]
  fn enable(&self, _signal: &AltSignal) {}

  #[inline]
  fn disable(&self, _signal: &AltSignal) {}

  #[inline]
  fn is_selectable(&self) -> bool {
    true
  }

  #[inline]
  fn select(&self) -> Result<(), CspError> {
    Ok(())
  }

  #[inline]
  fn is_usable(&self) -> bool {
    true
  }
}
