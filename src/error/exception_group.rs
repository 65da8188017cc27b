use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

/// Exception category indicating the nature of the error.
///
/// Groups provide semantic information for error handling and logging.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExceptionGroup {
  /// Invalid function argument or parameter.
  ///
  /// Indicates the caller provided data that violates function preconditions.
  BadArg,
  /// System capacity limit exceeded.
  SysCap,
  /// Operation invoked in a state that does not permit it.
  ///
  /// Indicates a usage bug such as starting a process twice or selecting on
  /// an alternation that is already mid-round.
  IllegalState,
}

impl ExceptionGroup {
  #[inline]
  pub(crate) const fn label(&self) -> &'static str {
    match self {
      Self::BadArg => "badarg",
      Self::SysCap => "syscap",
      Self::IllegalState => "illegal_state",
    }
  }
}

impl Display for ExceptionGroup {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    f.write_str(self.label())
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use crate::error::ExceptionGroup;

  #[test]
  fn test_display() {
    assert_eq!(format!("{}", ExceptionGroup::BadArg), "badarg");
    assert_eq!(format!("{}", ExceptionGroup::SysCap), "syscap");
    assert_eq!(format!("{}", ExceptionGroup::IllegalState), "illegal_state");
  }
}
