//! Error types for the csprt runtime.
//!
//! Two kinds of failure exist, with different propagation rules:
//!
//! 1. **Control-flow signals** ([`CspError`]): channel poison and alternation
//!    exhaustion. These are returned as `Result` values and are expected to
//!    be handled (usually with `?`) by process bodies.
//! 2. **Exceptions** ([`Exception`]): usage bugs such as starting a process
//!    twice. These are raised by panicking and must never be silently
//!    swallowed.
//!
//! # Raising Exceptions
//!
//! Use the [`raise!`] macro to construct and panic with an exception:
//!
//! ```should_panic
//! use csprt::raise;
//!
//! fn start(started: bool) {
//!   if started {
//!     raise!(Error, IllegalState, "process already started");
//!   }
//! }
//!
//! start(true);
//! ```
//!
//! [`raise!`]: crate::raise!

mod csp_error;
mod exception;
mod exception_class;
mod exception_group;

pub use self::csp_error::CspError;
pub use self::exception::Exception;
pub use self::exception_class::ExceptionClass;
pub use self::exception_group::ExceptionGroup;

// -----------------------------------------------------------------------------
// raise!
// -----------------------------------------------------------------------------

/// Raises an exception with the specified class, group, and message.
///
/// This macro constructs an [`Exception`] and immediately panics.
///
/// # Examples
///
/// ```should_panic
/// # use csprt::raise;
/// raise!(Error, BadArg, "barrier participants must be non-zero");
/// ```
#[macro_export]
macro_rules! raise {
  ($class:ident, $group:ident, $error:expr $(,)?) => {
    ::std::panic!(
      "{}",
      $crate::error::Exception::new(
        $crate::error::ExceptionClass::$class,
        $crate::error::ExceptionGroup::$group,
        $error,
      ),
    )
  };
}

// -----------------------------------------------------------------------------
// fatal!
// -----------------------------------------------------------------------------

/// Displays a runtime invariant violation and aborts the program.
///
/// Reserved for bugs in the runtime itself; the program aborts without
/// unwinding.
macro_rules! fatal {
  ($error:expr) => {{
    ::std::eprintln!(
      "{}:{}: a runtime invariant has been broken: {}",
      ::std::file!(),
      ::std::line!(),
      $error,
    );

    ::std::process::abort();
  }};
}

pub(crate) use fatal;

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
