//! csprt - A Communicating Sequential Processes runtime for Rust.
//!
//! csprt provides occam/CSP-style concurrency: independent processes that
//! synchronize exclusively through rendezvous channels and guarded choice,
//! never through shared mutable memory.
//!
//! # Quick Start
//!
//! ```no_run
//! use csprt::csp::Channel;
//! use csprt::csp::Par;
//! use csprt::csp::Process;
//!
//! let chan: Channel<u32> = Channel::new();
//! let send: Channel<u32> = chan.clone();
//!
//! let writer: Process = Process::new(move || send.write(42));
//! let reader: Process = Process::new(move || {
//!   assert_eq!(chan.read()?, 42);
//!   Ok(())
//! });
//!
//! Par::new([writer, reader]).start();
//! ```
//!
//! # Core Modules
//!
//! - [`csp`]: Channels, guards, alternation, processes, and composition
//! - [`builtins`]: Plug-and-play process bodies
//! - [`core`]: Process identifiers and the process table
//! - [`error`]: Recoverable errors and the exception system
//! - [`init`]: Tracing initialization
//! - [`consts`]: Runtime configuration constants

mod proc;
mod utils;

pub mod builtins;
pub mod consts;
pub mod core;
pub mod csp;
pub mod error;
pub mod init;
