use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

/// Recoverable control-flow errors raised by channel and alternation
/// operations.
///
/// These are expected signals, not defects: a pipeline stage that observes
/// [`CspError::Poisoned`] typically poisons its own neighbours and returns,
/// which unwinds the whole network.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum CspError {
  /// The channel was poisoned before or during the operation.
  Poisoned,
  /// No guard of the alternation can ever become ready.
  Exhausted,
}

impl CspError {
  /// Returns `true` if the error is `Poisoned`.
  #[inline]
  pub const fn is_poisoned(&self) -> bool {
    matches!(self, Self::Poisoned)
  }

  /// Returns `true` if the error is `Exhausted`.
  #[inline]
  pub const fn is_exhausted(&self) -> bool {
    matches!(self, Self::Exhausted)
  }
}

impl Display for CspError {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    match self {
      Self::Poisoned => f.write_str("channel poisoned"),
      Self::Exhausted => f.write_str("alternation exhausted"),
    }
  }
}

impl Error for CspError {}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
