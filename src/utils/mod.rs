//! Utility types and functions used throughout the runtime.
//!
//! # Contents
//!
//! - [`Rng`]: Small xorshift generator for random alternation
//! - [`ContextGuard`]: Thread-local "current process" scope

mod measure;
mod rng;
mod thread;

pub(crate) use self::measure::measure_fn;
pub(crate) use self::rng::Rng;
pub(crate) use self::thread::ContextGuard;
pub(crate) use self::thread::current;
