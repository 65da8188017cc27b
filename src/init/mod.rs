//! Runtime initialization.
//!
//! Installs the global tracing subscriber used to observe process
//! lifecycles, channel poison, and alternation decisions.

#[cfg(feature = "tracing")]
use std::fmt::Display;

use crate::csp::RuntimeConfig;
use crate::error::Exception;
#[cfg(feature = "tracing")]
use crate::error::ExceptionClass;
#[cfg(feature = "tracing")]
use crate::error::ExceptionGroup;

/// Installs a compact `fmt` subscriber configured from `config` as the global
/// default.
///
/// # Errors
///
/// Returns an `IllegalState` exception if a global subscriber is already
/// installed.
#[cfg(feature = "tracing")]
pub fn tracing_subscriber(config: &RuntimeConfig) -> Result<(), Exception> {
  use tracing_subscriber::FmtSubscriber;
  use tracing_subscriber::fmt::format;
  use tracing_subscriber::util::SubscriberInitExt;

  FmtSubscriber::builder()
    .event_format(format().compact())
    .log_internal_errors(true)
    .with_ansi(true)
    .with_file(config.tracing_source_file)
    .with_level(true)
    .with_line_number(config.tracing_source_line)
    .with_max_level(config.tracing_filter())
    .with_target(config.tracing_source_name)
    .with_thread_ids(config.tracing_thread_info)
    .with_thread_names(config.tracing_thread_info)
    .finish()
    .try_init()
    .map_err(error)
}

/// Installs nothing; the `tracing` feature is disabled.
#[cfg(not(feature = "tracing"))]
pub fn tracing_subscriber(_config: &RuntimeConfig) -> Result<(), Exception> {
  Ok(())
}

#[cfg(feature = "tracing")]
fn error<E>(error: E) -> Exception
where
  E: Display,
{
  Exception::new(ExceptionClass::Error, ExceptionGroup::IllegalState, error)
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
