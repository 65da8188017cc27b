use std::any::Any;
use std::borrow::Cow;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::panic;

use crate::error::CspError;

/// The reason a process terminated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Exit {
  /// The body returned `Ok(())`.
  #[default]
  Normal,
  /// The body returned [`CspError::Poisoned`].
  Poisoned,
  /// The body returned [`CspError::Exhausted`].
  Exhausted,
  /// The body panicked; carries the panic message.
  Panic(Cow<'static, str>),
}

impl Exit {
  /// Returns `true` if the process terminated normally.
  #[inline]
  pub const fn is_normal(&self) -> bool {
    matches!(self, Self::Normal)
  }

  /// Returns `true` if the process terminated for any other reason.
  #[inline]
  pub const fn is_abnormal(&self) -> bool {
    !self.is_normal()
  }

  /// Returns `true` if the process terminated by panicking.
  #[inline]
  pub const fn is_panic(&self) -> bool {
    matches!(self, Self::Panic(_))
  }

  /// Builds an exit reason from a caught panic payload.
  pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
      return Self::Panic(Cow::Borrowed(*message));
    }

    match payload.downcast::<String>() {
      Ok(message) => Self::Panic(Cow::Owned(*message)),
      Err(_) => Self::Panic(Cow::Borrowed("unknown panic payload")),
    }
  }

  /// Re-raises this exit reason in the calling body.
  ///
  /// Poison and exhaustion are returned as errors; a panic resumes unwinding
  /// with the original message.
  pub(crate) fn propagate(self) -> Result<(), CspError> {
    match self {
      Self::Normal => Ok(()),
      Self::Poisoned => Err(CspError::Poisoned),
      Self::Exhausted => Err(CspError::Exhausted),
      Self::Panic(message) => panic::resume_unwind(Box::new(message.into_owned())),
    }
  }
}

impl From<Result<(), CspError>> for Exit {
  #[inline]
  fn from(other: Result<(), CspError>) -> Self {
    match other {
      Ok(()) => Self::Normal,
      Err(CspError::Poisoned) => Self::Poisoned,
      Err(CspError::Exhausted) => Self::Exhausted,
    }
  }
}

impl Display for Exit {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self {
      Self::Normal => f.write_str("normal"),
      Self::Poisoned => f.write_str("poisoned"),
      Self::Exhausted => f.write_str("exhausted"),
      Self::Panic(message) => write!(f, "panic: {message}"),
    }
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
